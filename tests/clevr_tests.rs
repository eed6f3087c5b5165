use std::time::Duration;

use ecdsl::domains::clevr::scene;
use ecdsl::{DomainBundle, EvalError, SceneObject, Value, evaluate, load_primitive_sets, parse};

const TIMEOUT: Duration = Duration::from_secs(5);

fn bootstrap() -> DomainBundle {
    load_primitive_sets(&["clevr_bootstrap"]).unwrap()
}

/// Three objects: a small red rubber cube (0), a large blue metal sphere
/// (1), and a large red metal cylinder (2), laid out left to right.
fn fixture() -> Value {
    scene(vec![
        SceneObject {
            id: 0,
            color: "red".to_string(),
            size: "small".to_string(),
            shape: "cube".to_string(),
            material: "rubber".to_string(),
            left: vec![],
            right: vec![1, 2],
            front: vec![],
            behind: vec![],
        },
        SceneObject {
            id: 1,
            color: "blue".to_string(),
            size: "large".to_string(),
            shape: "sphere".to_string(),
            material: "metal".to_string(),
            left: vec![0],
            right: vec![2],
            front: vec![],
            behind: vec![],
        },
        SceneObject {
            id: 2,
            color: "red".to_string(),
            size: "large".to_string(),
            shape: "cylinder".to_string(),
            material: "metal".to_string(),
            left: vec![0, 1],
            right: vec![],
            front: vec![],
            behind: vec![],
        },
    ])
}

fn run(bundle: &DomainBundle, text: &str) -> Result<Value, EvalError> {
    let program = parse(&bundle.registry, text).unwrap();
    evaluate(&program, &[fixture()], TIMEOUT)
}

// ============================================================================
// Filters and counting
// ============================================================================

#[test]
fn test_filter_color_and_count() {
    let bundle = bootstrap();
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_filter_color $0 clevr_red)))"
        ),
        Ok(Value::Int(2))
    );
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_filter_material $0 clevr_rubber)))"
        ),
        Ok(Value::Int(1))
    );
}

#[test]
fn test_exist_and_empty() {
    let bundle = bootstrap();
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_exist? (clevr_filter_shape $0 clevr_sphere)))"
        ),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_empty? (clevr_filter_color $0 clevr_purple)))"
        ),
        Ok(Value::Bool(true))
    );
}

#[test]
fn test_car_and_cdr() {
    let bundle = bootstrap();
    assert_eq!(
        run(&bundle, "(lambda (clevr_query_shape (clevr_car $0)))"),
        Ok(Value::str("cube"))
    );
    assert_eq!(
        run(&bundle, "(lambda (clevr_count (clevr_cdr $0)))"),
        Ok(Value::Int(2))
    );
}

#[test]
fn test_car_of_an_empty_list_is_a_runtime_outcome() {
    let bundle = bootstrap();
    assert!(matches!(
        run(
            &bundle,
            "(lambda (clevr_car (clevr_filter_color $0 clevr_purple)))"
        ),
        Err(EvalError::Runtime { .. })
    ));
}

// ============================================================================
// Set operations and relations
// ============================================================================

#[test]
fn test_set_operations_go_by_object_id() {
    let bundle = bootstrap();
    // everything minus the red objects leaves the sphere
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_difference $0 (clevr_filter_color $0 clevr_red))))"
        ),
        Ok(Value::Int(1))
    );
    // red AND large is just the cylinder
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_intersect (clevr_filter_color $0 clevr_red) \
             (clevr_filter_size $0 clevr_large))))"
        ),
        Ok(Value::Int(1))
    );
    // red OR large covers the whole scene, without double-counting
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_union (clevr_filter_color $0 clevr_red) \
             (clevr_filter_size $0 clevr_large))))"
        ),
        Ok(Value::Int(3))
    );
}

#[test]
fn test_unique_requires_a_singleton() {
    let bundle = bootstrap();
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_query_color (clevr_unique (clevr_filter_shape $0 clevr_sphere))))"
        ),
        Ok(Value::str("blue"))
    );
    assert!(matches!(
        run(
            &bundle,
            "(lambda (clevr_unique (clevr_filter_color $0 clevr_red)))"
        ),
        Err(EvalError::Runtime { .. })
    ));
}

#[test]
fn test_relate_filters_the_scene_by_relation() {
    let bundle = bootstrap();
    // objects to the right of the sphere: the cylinder only
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_relate \
             (clevr_unique (clevr_filter_shape $0 clevr_sphere)) clevr_right $0)))"
        ),
        Ok(Value::Int(1))
    );
}

// ============================================================================
// Queries and comparisons
// ============================================================================

#[test]
fn test_attribute_queries_and_equality() {
    let bundle = bootstrap();
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_eq_color (clevr_query_color (clevr_car $0)) clevr_red))"
        ),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_eq_material (clevr_query_material (clevr_car $0)) clevr_metal))"
        ),
        Ok(Value::Bool(false))
    );
}

#[test]
fn test_integer_comparisons() {
    let bundle = bootstrap();
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_gt? (clevr_count $0) (clevr_count (clevr_filter_color $0 clevr_red))))"
        ),
        Ok(Value::Bool(true))
    );
    assert_eq!(run(&bundle, "(lambda (clevr_lt? 3 2))"), Ok(Value::Bool(false)));
    assert_eq!(run(&bundle, "(lambda (clevr_eq_int 2 2))"), Ok(Value::Bool(true)));
}

// ============================================================================
// Map / transform set
// ============================================================================

#[test]
fn test_map_transform_rewrites_every_object() {
    let bundle = load_primitive_sets(&["clevr_bootstrap", "clevr_map_transform"]).unwrap();
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_filter_color \
             (clevr_map (clevr_transform_color clevr_gray) $0) clevr_gray)))"
        ),
        Ok(Value::Int(3))
    );
    // the original attributes are untouched elsewhere in the program
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_eq_size (clevr_query_size \
             (clevr_car (clevr_map (clevr_transform_material clevr_rubber) $0))) clevr_small))"
        ),
        Ok(Value::Bool(true))
    );
}

// ============================================================================
// Ablation subsets
// ============================================================================

#[test]
fn test_filter_subset_has_no_set_operations() {
    let bundle = load_primitive_sets(&["clevr_filter"]).unwrap();
    assert!(bundle.registry.contains("clevr_filter_color"));
    assert!(bundle.registry.contains("clevr_count"));
    assert!(!bundle.registry.contains("clevr_union"));
    assert!(!bundle.registry.contains("clevr_map"));
}

#[test]
fn test_difference_subset_still_counts() {
    let bundle = load_primitive_sets(&["clevr_difference"]).unwrap();
    assert_eq!(
        run(
            &bundle,
            "(lambda (clevr_count (clevr_difference $0 $0)))"
        ),
        Ok(Value::Int(0))
    );
    assert!(!bundle.registry.contains("clevr_filter_color"));
}
