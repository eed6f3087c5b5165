//! Runtime values and the primitive record.
//!
//! A [`Primitive`] is a named, typed leaf of the language. It carries
//! either a host-evaluable implementation (a constant for zero-arity
//! primitives, a native function for the rest) or the explicit
//! [`Implementation::External`] marker for constructs that only the
//! external solver can execute. The marker is a first-class, checkable
//! property: callers branch on [`Primitive::is_host_evaluable`] instead of
//! attempting evaluation and catching the failure.

use std::fmt;
use std::sync::Arc;

use crate::interner::InternedSymbol;
use crate::interpreter::{EvalContext, EvalError};
use crate::program::Program;
use crate::types::Type;

// ============================================================================
// Values
// ============================================================================

/// A native function callable from DSL programs.
///
/// The context carries the active evaluation deadline and lets
/// higher-order primitives apply functional arguments.
pub type NativeFn = fn(&[Value], &mut EvalContext) -> Result<Value, EvalError>;

/// A runtime value of the combinator language.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Str(Arc<str>),
    List(Arc<Vec<Value>>),
    /// A CLEVR scene object.
    Obj(Arc<SceneObject>),
    /// A turtle-graphics canvas: pen pose plus drawn segments.
    Canvas(Arc<Canvas>),
    /// A lambda closed over the de Bruijn value stack.
    Closure(Arc<Closure>),
    /// A partially applied n-ary primitive awaiting more arguments.
    Partial(Arc<PartialApply>),
}

#[derive(Debug, Clone)]
pub struct Closure {
    pub body: Program,
    pub env: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct PartialApply {
    pub primitive: Arc<Primitive>,
    pub args: Vec<Value>,
}

/// One object of a CLEVR scene, with its attributes and the ids of the
/// objects standing in each spatial relation to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: usize,
    pub color: String,
    pub size: String,
    pub shape: String,
    pub material: String,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub front: Vec<usize>,
    pub behind: Vec<usize>,
}

impl SceneObject {
    /// The ids related to this object under a relation name.
    pub fn related(&self, relation: &str) -> Option<&[usize]> {
        match relation {
            "left" => Some(&self.left),
            "right" => Some(&self.right),
            "front" => Some(&self.front),
            "behind" => Some(&self.behind),
            _ => None,
        }
    }
}

/// A line segment drawn by the turtle, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// The turtle state: position, heading (radians), pen flag, and the
/// segments drawn so far. Updates are functional; the interpreter shares
/// canvases through `Arc` and never mutates one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub pen_up: bool,
    pub segments: Vec<Segment>,
}

impl Canvas {
    /// A fresh canvas: origin, heading 0, pen down, nothing drawn.
    pub fn new() -> Canvas {
        Canvas {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_up: false,
            segments: Vec::new(),
        }
    }

    /// Move forward by `length`, drawing if the pen is down, then turn by
    /// `angle` radians.
    pub fn forward_rotate(&self, length: f64, angle: f64) -> Canvas {
        let mut next = self.clone();
        next.x = self.x + length * self.heading.cos();
        next.y = self.y + length * self.heading.sin();
        if !self.pen_up && length != 0.0 {
            next.segments.push(Segment {
                x0: self.x,
                y0: self.y,
                x1: next.x,
                y1: next.y,
            });
        }
        next.heading = self.heading + angle;
        next
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::new()
    }
}

// Closures compare by body and captured stack; partials by primitive name
// and accumulated arguments. Function pointers inside primitives are
// deliberately not part of equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Obj(a), Value::Obj(b)) => a == b,
            (Value::Canvas(a), Value::Canvas(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => a.body == b.body && a.env == b.env,
            (Value::Partial(a), Value::Partial(b)) => {
                a.primitive == b.primitive && a.args == b.args
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Obj(obj) => write!(
                f,
                "<{} {} {} {}>",
                obj.size, obj.color, obj.material, obj.shape
            ),
            Value::Canvas(canvas) => write!(f, "<canvas: {} segments>", canvas.segments.len()),
            Value::Closure(_) => write!(f, "<closure>"),
            Value::Partial(partial) => write!(
                f,
                "<{} applied to {} of {}>",
                partial.primitive.name(),
                partial.args.len(),
                partial.primitive.arity()
            ),
        }
    }
}

impl Value {
    /// Build a string value.
    pub fn str(s: &str) -> Value {
        Value::Str(Arc::from(s))
    }

    /// Build a list value.
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Arc::new(items))
    }
}

// ============================================================================
// Value extraction helpers for native functions
// ============================================================================

fn type_failure(expected: &str, value: &Value) -> EvalError {
    EvalError::Runtime {
        cause: format!("expected {expected}, got {value}"),
    }
}

pub fn as_int(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(n) => Ok(*n),
        _ => Err(type_failure("integer", value)),
    }
}

pub fn as_real(value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Real(r) => Ok(*r),
        _ => Err(type_failure("real", value)),
    }
}

pub fn as_str(value: &Value) -> Result<&str, EvalError> {
    match value {
        Value::Str(s) => Ok(s),
        _ => Err(type_failure("string", value)),
    }
}

pub fn as_list(value: &Value) -> Result<&Arc<Vec<Value>>, EvalError> {
    match value {
        Value::List(items) => Ok(items),
        _ => Err(type_failure("list", value)),
    }
}

pub fn as_obj(value: &Value) -> Result<&Arc<SceneObject>, EvalError> {
    match value {
        Value::Obj(obj) => Ok(obj),
        _ => Err(type_failure("scene object", value)),
    }
}

pub fn as_canvas(value: &Value) -> Result<&Arc<Canvas>, EvalError> {
    match value {
        Value::Canvas(canvas) => Ok(canvas),
        _ => Err(type_failure("canvas", value)),
    }
}

// ============================================================================
// Primitive
// ============================================================================

/// How a primitive is executed.
#[derive(Debug, Clone)]
pub enum Implementation {
    /// A zero-arity host value.
    Constant(Value),
    /// A host function from argument values to a result.
    Function(NativeFn),
    /// No host implementation; programs reaching this primitive are
    /// printed and handed to the external solver.
    External,
}

/// A named, typed leaf operation of the language.
#[derive(Debug, Clone)]
pub struct Primitive {
    name: InternedSymbol,
    tp: Type,
    implementation: Implementation,
    comment: String,
}

impl Primitive {
    /// Build a primitive record. Name-uniqueness and implementation-shape
    /// validation live in the registry, which is the only constructor used
    /// outside literals synthesised by the parser.
    pub(crate) fn new(
        name: InternedSymbol,
        tp: Type,
        implementation: Implementation,
        comment: &str,
    ) -> Primitive {
        Primitive {
            name,
            tp,
            implementation,
            comment: comment.to_string(),
        }
    }

    /// An anonymous integer-constant primitive, used by the parser for
    /// numeric literals that are not declared in the registry.
    pub fn integer_literal(value: i64, int_type: Type) -> Arc<Primitive> {
        Arc::new(Primitive::new(
            InternedSymbol::new(&value.to_string()),
            int_type,
            Implementation::Constant(Value::Int(value)),
            "integer literal",
        ))
    }

    pub fn name(&self) -> InternedSymbol {
        self.name
    }

    pub fn tp(&self) -> &Type {
        &self.tp
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// Number of curried arguments, derived from the declared type.
    pub fn arity(&self) -> usize {
        self.tp.arity()
    }

    /// Whether this core's interpreter can execute the primitive, as
    /// opposed to deferring to the external solver.
    pub fn is_host_evaluable(&self) -> bool {
        !matches!(self.implementation, Implementation::External)
    }

    /// Apply the host implementation to exactly `arity()` argument values.
    pub fn apply(&self, args: &[Value], ctx: &mut EvalContext) -> Result<Value, EvalError> {
        if args.len() != self.arity() {
            return Err(EvalError::ArityMismatch {
                primitive: self.name.resolve(),
                expected: self.arity(),
                found: args.len(),
            });
        }
        match &self.implementation {
            Implementation::Constant(value) => Ok(value.clone()),
            Implementation::Function(function) => function(args, ctx),
            Implementation::External => Err(EvalError::RequiresExternalSolver {
                primitive: self.name.resolve(),
            }),
        }
    }
}

// Registry uniqueness makes the name the identity.
impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Primitive {}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
