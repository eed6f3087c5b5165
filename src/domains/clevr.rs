//! The CLEVR scene-reasoning vocabulary.
//!
//! Scenes are lists of [`SceneObject`]s; attributes (color, size, shape,
//! material) and spatial relations are string constants with their own
//! base types. The primitive sets mirror the original run configurations:
//! `clevr_bootstrap` is the base DSL, `clevr_map_transform` adds mapping
//! and attribute rewriting, and `clevr_filter` / `clevr_difference` are
//! the ablation subsets selectable on their own.

use std::sync::Arc;

use crate::interpreter::{EvalContext, EvalError};
use crate::language::{
    Implementation, Primitive, SceneObject, Value, as_int, as_list, as_obj, as_str,
};
use crate::registry::{PrimitiveRegistry, RegistryError};
use crate::types::Type;

pub const COLORS: [&str; 8] = [
    "gray", "red", "blue", "green", "brown", "purple", "cyan", "yellow",
];
pub const SIZES: [&str; 2] = ["small", "large"];
pub const SHAPES: [&str; 3] = ["cube", "sphere", "cylinder"];
pub const MATERIALS: [&str; 2] = ["rubber", "metal"];
pub const RELATIONS: [&str; 4] = ["left", "right", "front", "behind"];

/// Wrap scene objects as the list value programs consume.
pub fn scene(objects: Vec<SceneObject>) -> Value {
    Value::list(objects.into_iter().map(|o| Value::Obj(Arc::new(o))).collect())
}

// ============================================================================
// Native functions: lists
// ============================================================================

fn count(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Int(as_list(&args[0])?.len() as i64))
}

fn empty(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_list(&args[0])?.is_empty()))
}

fn exist(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Bool(!as_list(&args[0])?.is_empty()))
}

fn car(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    as_list(&args[0])?
        .first()
        .cloned()
        .ok_or_else(|| EvalError::runtime("clevr_car: empty object list"))
}

fn cdr(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let items = as_list(&args[0])?;
    if items.is_empty() {
        return Err(EvalError::runtime("clevr_cdr: empty object list"));
    }
    Ok(Value::list(items[1..].to_vec()))
}

fn object_ids(list: &Value) -> Result<Vec<usize>, EvalError> {
    as_list(list)?
        .iter()
        .map(|value| as_obj(value).map(|obj| obj.id))
        .collect()
}

fn union(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let mut items = as_list(&args[0])?.as_ref().clone();
    let seen = object_ids(&args[0])?;
    for value in as_list(&args[1])?.iter() {
        if !seen.contains(&as_obj(value)?.id) {
            items.push(value.clone());
        }
    }
    Ok(Value::list(items))
}

fn intersect(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let keep = object_ids(&args[1])?;
    let items = as_list(&args[0])?
        .iter()
        .filter(|value| {
            as_obj(value).map(|obj| keep.contains(&obj.id)).unwrap_or(false)
        })
        .cloned()
        .collect();
    Ok(Value::list(items))
}

fn difference(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let drop = object_ids(&args[1])?;
    let items = as_list(&args[0])?
        .iter()
        .filter(|value| {
            as_obj(value).map(|obj| !drop.contains(&obj.id)).unwrap_or(false)
        })
        .cloned()
        .collect();
    Ok(Value::list(items))
}

fn unique(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let items = as_list(&args[0])?;
    match items.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(EvalError::runtime(format!(
            "clevr_unique: expected exactly one object, got {}",
            items.len()
        ))),
    }
}

fn relate(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let obj = as_obj(&args[0])?;
    let relation = as_str(&args[1])?;
    let related = obj
        .related(relation)
        .ok_or_else(|| EvalError::runtime(format!("clevr_relate: unknown relation {relation}")))?;
    let items = as_list(&args[2])?
        .iter()
        .filter(|value| {
            as_obj(value).map(|o| related.contains(&o.id)).unwrap_or(false)
        })
        .cloned()
        .collect();
    Ok(Value::list(items))
}

fn map(args: &[Value], ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let items = as_list(&args[1])?.as_ref().clone();
    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        mapped.push(ctx.apply(&args[0], item)?);
    }
    Ok(Value::list(mapped))
}

// ============================================================================
// Native functions: attributes
// ============================================================================

fn attribute(obj: &SceneObject, attribute: &str) -> String {
    match attribute {
        "color" => obj.color.clone(),
        "size" => obj.size.clone(),
        "shape" => obj.shape.clone(),
        _ => obj.material.clone(),
    }
}

fn filter_by(args: &[Value], attr: &str) -> Result<Value, EvalError> {
    let wanted = as_str(&args[1])?;
    let items = as_list(&args[0])?
        .iter()
        .filter(|value| {
            as_obj(value)
                .map(|obj| attribute(obj, attr) == wanted)
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    Ok(Value::list(items))
}

fn filter_color(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    filter_by(args, "color")
}

fn filter_size(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    filter_by(args, "size")
}

fn filter_shape(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    filter_by(args, "shape")
}

fn filter_material(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    filter_by(args, "material")
}

fn query_by(args: &[Value], attr: &str) -> Result<Value, EvalError> {
    Ok(Value::str(&attribute(as_obj(&args[0])?, attr)))
}

fn query_color(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    query_by(args, "color")
}

fn query_size(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    query_by(args, "size")
}

fn query_shape(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    query_by(args, "shape")
}

fn query_material(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    query_by(args, "material")
}

fn transform_by(args: &[Value], attr: &str) -> Result<Value, EvalError> {
    let replacement = as_str(&args[0])?;
    let mut obj = as_obj(&args[1])?.as_ref().clone();
    match attr {
        "color" => obj.color = replacement.to_string(),
        "size" => obj.size = replacement.to_string(),
        "shape" => obj.shape = replacement.to_string(),
        _ => obj.material = replacement.to_string(),
    }
    Ok(Value::Obj(Arc::new(obj)))
}

fn transform_color(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    transform_by(args, "color")
}

fn transform_size(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    transform_by(args, "size")
}

fn transform_shape(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    transform_by(args, "shape")
}

fn transform_material(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    transform_by(args, "material")
}

fn attr_eq(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_str(&args[0])? == as_str(&args[1])?))
}

fn int_eq(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_int(&args[0])? == as_int(&args[1])?))
}

fn int_gt(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_int(&args[0])? > as_int(&args[1])?))
}

fn int_lt(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Bool(as_int(&args[0])? < as_int(&args[1])?))
}

// ============================================================================
// Declarations
// ============================================================================

struct ClevrTypes {
    int: Type,
    bool: Type,
    color: Type,
    size: Type,
    shape: Type,
    material: Type,
    relation: Type,
    object: Type,
    objlist: Type,
}

impl ClevrTypes {
    fn new() -> ClevrTypes {
        ClevrTypes {
            int: Type::base("int"),
            bool: Type::base("bool"),
            color: Type::base("clevr_color"),
            size: Type::base("clevr_size"),
            shape: Type::base("clevr_shape"),
            material: Type::base("clevr_material"),
            relation: Type::base("clevr_relation"),
            object: Type::base("clevr_object"),
            objlist: Type::base("clevr_objlist"),
        }
    }
}

fn arrow(components: &[Type]) -> Type {
    Type::arrow(components).expect("well-formed arrow")
}

fn declare_constants(
    registry: &mut PrimitiveRegistry,
    tp: &Type,
    names: &[&str],
    what: &str,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    names
        .iter()
        .map(|name| {
            registry.declare(
                &format!("clevr_{name}"),
                tp.clone(),
                Implementation::Constant(Value::str(name)),
                &format!("Constant {what} {name}"),
            )
        })
        .collect()
}

fn declare_attribute_constants(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let t = ClevrTypes::new();
    let mut primitives = declare_constants(registry, &t.color, &COLORS, "color")?;
    primitives.extend(declare_constants(registry, &t.size, &SIZES, "size")?);
    primitives.extend(declare_constants(registry, &t.shape, &SHAPES, "shape")?);
    primitives.extend(declare_constants(registry, &t.material, &MATERIALS, "material")?);
    primitives.extend(declare_constants(registry, &t.relation, &RELATIONS, "spatial relation")?);
    Ok(primitives)
}

fn declare_digits(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let int = Type::base("int");
    (0..10)
        .map(|digit| {
            registry.declare(
                &digit.to_string(),
                int.clone(),
                Implementation::Constant(Value::Int(digit)),
                &format!("Integer constant of value {digit}"),
            )
        })
        .collect()
}

fn declare_filters(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let t = ClevrTypes::new();
    Ok(vec![
        registry.declare(
            "clevr_filter_color",
            arrow(&[t.objlist.clone(), t.color.clone(), t.objlist.clone()]),
            Implementation::Function(filter_color),
            "Objects of a color",
        )?,
        registry.declare(
            "clevr_filter_size",
            arrow(&[t.objlist.clone(), t.size.clone(), t.objlist.clone()]),
            Implementation::Function(filter_size),
            "Objects of a size",
        )?,
        registry.declare(
            "clevr_filter_shape",
            arrow(&[t.objlist.clone(), t.shape.clone(), t.objlist.clone()]),
            Implementation::Function(filter_shape),
            "Objects of a shape",
        )?,
        registry.declare(
            "clevr_filter_material",
            arrow(&[t.objlist.clone(), t.material.clone(), t.objlist.clone()]),
            Implementation::Function(filter_material),
            "Objects of a material",
        )?,
    ])
}

/// The base scene-reasoning DSL.
pub fn declare_bootstrap(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let t = ClevrTypes::new();
    let mut primitives = declare_attribute_constants(registry)?;
    primitives.extend(declare_digits(registry)?);
    primitives.extend(declare_filters(registry)?);
    primitives.extend([
        registry.declare(
            "clevr_count",
            arrow(&[t.objlist.clone(), t.int.clone()]),
            Implementation::Function(count),
            "Number of objects in a list",
        )?,
        registry.declare(
            "clevr_empty?",
            arrow(&[t.objlist.clone(), t.bool.clone()]),
            Implementation::Function(empty),
            "Whether a list has no objects",
        )?,
        registry.declare(
            "clevr_exist?",
            arrow(&[t.objlist.clone(), t.bool.clone()]),
            Implementation::Function(exist),
            "Whether a list has any object",
        )?,
        registry.declare(
            "clevr_car",
            arrow(&[t.objlist.clone(), t.object.clone()]),
            Implementation::Function(car),
            "First object of a list",
        )?,
        registry.declare(
            "clevr_cdr",
            arrow(&[t.objlist.clone(), t.objlist.clone()]),
            Implementation::Function(cdr),
            "A list without its first object",
        )?,
        registry.declare(
            "clevr_union",
            arrow(&[t.objlist.clone(), t.objlist.clone(), t.objlist.clone()]),
            Implementation::Function(union),
            "Objects in either list, by id",
        )?,
        registry.declare(
            "clevr_intersect",
            arrow(&[t.objlist.clone(), t.objlist.clone(), t.objlist.clone()]),
            Implementation::Function(intersect),
            "Objects in both lists, by id",
        )?,
        registry.declare(
            "clevr_difference",
            arrow(&[t.objlist.clone(), t.objlist.clone(), t.objlist.clone()]),
            Implementation::Function(difference),
            "Objects in the first list only, by id",
        )?,
        registry.declare(
            "clevr_unique",
            arrow(&[t.objlist.clone(), t.object.clone()]),
            Implementation::Function(unique),
            "The sole object of a singleton list",
        )?,
        registry.declare(
            "clevr_relate",
            arrow(&[
                t.object.clone(),
                t.relation.clone(),
                t.objlist.clone(),
                t.objlist.clone(),
            ]),
            Implementation::Function(relate),
            "Objects of a list standing in a relation to an object",
        )?,
        registry.declare(
            "clevr_query_color",
            arrow(&[t.object.clone(), t.color.clone()]),
            Implementation::Function(query_color),
            "Color of an object",
        )?,
        registry.declare(
            "clevr_query_size",
            arrow(&[t.object.clone(), t.size.clone()]),
            Implementation::Function(query_size),
            "Size of an object",
        )?,
        registry.declare(
            "clevr_query_shape",
            arrow(&[t.object.clone(), t.shape.clone()]),
            Implementation::Function(query_shape),
            "Shape of an object",
        )?,
        registry.declare(
            "clevr_query_material",
            arrow(&[t.object.clone(), t.material.clone()]),
            Implementation::Function(query_material),
            "Material of an object",
        )?,
        registry.declare(
            "clevr_eq_color",
            arrow(&[t.color.clone(), t.color.clone(), t.bool.clone()]),
            Implementation::Function(attr_eq),
            "Color equality",
        )?,
        registry.declare(
            "clevr_eq_size",
            arrow(&[t.size.clone(), t.size.clone(), t.bool.clone()]),
            Implementation::Function(attr_eq),
            "Size equality",
        )?,
        registry.declare(
            "clevr_eq_shape",
            arrow(&[t.shape.clone(), t.shape.clone(), t.bool.clone()]),
            Implementation::Function(attr_eq),
            "Shape equality",
        )?,
        registry.declare(
            "clevr_eq_material",
            arrow(&[t.material.clone(), t.material.clone(), t.bool.clone()]),
            Implementation::Function(attr_eq),
            "Material equality",
        )?,
        registry.declare(
            "clevr_eq_int",
            arrow(&[t.int.clone(), t.int.clone(), t.bool.clone()]),
            Implementation::Function(int_eq),
            "Integer equality",
        )?,
        registry.declare(
            "clevr_gt?",
            arrow(&[t.int.clone(), t.int.clone(), t.bool.clone()]),
            Implementation::Function(int_gt),
            "Integer greater-than",
        )?,
        registry.declare(
            "clevr_lt?",
            arrow(&[t.int.clone(), t.int.clone(), t.bool.clone()]),
            Implementation::Function(int_lt),
            "Integer less-than",
        )?,
    ]);
    Ok(primitives)
}

/// Mapping and attribute rewriting, layered over the bootstrap types.
pub fn declare_map_transform(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let t = ClevrTypes::new();
    let object_map = arrow(&[t.object.clone(), t.object.clone()]);
    Ok(vec![
        registry.declare(
            "clevr_map",
            arrow(&[object_map, t.objlist.clone(), t.objlist.clone()]),
            Implementation::Function(map),
            "Apply an object transform across a list",
        )?,
        registry.declare(
            "clevr_transform_color",
            arrow(&[t.color.clone(), t.object.clone(), t.object.clone()]),
            Implementation::Function(transform_color),
            "Rewrite an object's color",
        )?,
        registry.declare(
            "clevr_transform_size",
            arrow(&[t.size.clone(), t.object.clone(), t.object.clone()]),
            Implementation::Function(transform_size),
            "Rewrite an object's size",
        )?,
        registry.declare(
            "clevr_transform_shape",
            arrow(&[t.shape.clone(), t.object.clone(), t.object.clone()]),
            Implementation::Function(transform_shape),
            "Rewrite an object's shape",
        )?,
        registry.declare(
            "clevr_transform_material",
            arrow(&[t.material.clone(), t.object.clone(), t.object.clone()]),
            Implementation::Function(transform_material),
            "Rewrite an object's material",
        )?,
    ])
}

/// Ablation subset: attribute constants and filters only.
pub fn declare_filter(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let t = ClevrTypes::new();
    let mut primitives = declare_attribute_constants(registry)?;
    primitives.extend(declare_filters(registry)?);
    primitives.push(registry.declare(
        "clevr_count",
        arrow(&[t.objlist.clone(), t.int.clone()]),
        Implementation::Function(count),
        "Number of objects in a list",
    )?);
    primitives.push(registry.declare(
        "clevr_exist?",
        arrow(&[t.objlist.clone(), t.bool.clone()]),
        Implementation::Function(exist),
        "Whether a list has any object",
    )?);
    Ok(primitives)
}

/// Ablation subset: set difference and counting only.
pub fn declare_difference(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let t = ClevrTypes::new();
    let mut primitives = declare_attribute_constants(registry)?;
    primitives.push(registry.declare(
        "clevr_difference",
        arrow(&[t.objlist.clone(), t.objlist.clone(), t.objlist.clone()]),
        Implementation::Function(difference),
        "Objects in the first list only, by id",
    )?);
    primitives.push(registry.declare(
        "clevr_count",
        arrow(&[t.objlist.clone(), t.int.clone()]),
        Implementation::Function(count),
        "Number of objects in a list",
    )?);
    Ok(primitives)
}
