//! The turtle-graphics vocabulary.
//!
//! Angles are radians (`logo_UA`, the unit angle, is one full turn of 2π);
//! lengths are canvas units (`logo_UL` is 1.0). The turtle value is a
//! [`Canvas`] carrying the pen pose and the segments drawn so far.
//! `logo_forLoop` has no finite host-language expansion and is declared
//! external-solver-only.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::interpreter::{EvalContext, EvalError};
use crate::language::{Implementation, Primitive, Value, as_canvas, as_int, as_real};
use crate::registry::{PrimitiveRegistry, RegistryError};
use crate::types::Type;

const EPSILON_ANGLE: f64 = TAU / 64.0;
const EPSILON_LENGTH: f64 = 1.0 / 16.0;

// ============================================================================
// Native functions
// ============================================================================

fn diva(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let angle = as_real(&args[0])?;
    let divisor = as_int(&args[1])?;
    if divisor == 0 {
        return Err(EvalError::runtime("logo_DIVA: division by zero"));
    }
    Ok(Value::Real(angle / divisor as f64))
}

fn mula(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Real(as_real(&args[0])? * as_int(&args[1])? as f64))
}

fn divl(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let length = as_real(&args[0])?;
    let divisor = as_int(&args[1])?;
    if divisor == 0 {
        return Err(EvalError::runtime("logo_DIVL: division by zero"));
    }
    Ok(Value::Real(length / divisor as f64))
}

fn mull(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Real(as_real(&args[0])? * as_int(&args[1])? as f64))
}

fn adda(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Real(as_real(&args[0])? + as_real(&args[1])?))
}

fn suba(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    Ok(Value::Real(as_real(&args[0])? - as_real(&args[1])?))
}

fn fwrt(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let length = as_real(&args[0])?;
    let angle = as_real(&args[1])?;
    let canvas = as_canvas(&args[2])?;
    Ok(Value::Canvas(Arc::new(canvas.forward_rotate(length, angle))))
}

/// Run a pen transform, then restore the pose it started from. Segments
/// drawn by the transform are kept.
fn getset(args: &[Value], ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let before = as_canvas(&args[1])?.clone();
    let after = ctx.apply(&args[0], args[1].clone())?;
    let mut restored = as_canvas(&after)?.as_ref().clone();
    restored.x = before.x;
    restored.y = before.y;
    restored.heading = before.heading;
    restored.pen_up = before.pen_up;
    Ok(Value::Canvas(Arc::new(restored)))
}

/// Run a pen transform with the pen lifted, restoring the pen flag after.
fn pen_transform(args: &[Value], ctx: &mut EvalContext) -> Result<Value, EvalError> {
    let before = as_canvas(&args[1])?.clone();
    let mut lifted = before.as_ref().clone();
    lifted.pen_up = true;
    let after = ctx.apply(&args[0], Value::Canvas(Arc::new(lifted)))?;
    let mut restored = as_canvas(&after)?.as_ref().clone();
    restored.pen_up = before.pen_up;
    Ok(Value::Canvas(Arc::new(restored)))
}

// ============================================================================
// Declarations
// ============================================================================

/// Declare the turtle vocabulary into `registry`, returning the declared
/// primitives in order.
pub fn declare_primitives(
    registry: &mut PrimitiveRegistry,
) -> Result<Vec<Arc<Primitive>>, RegistryError> {
    let int = Type::base("int");
    let turtle = Type::base("turtle");
    let tangle = Type::base("tangle");
    let tlength = Type::base("tlength");
    let pen = Type::arrow(&[turtle.clone(), turtle.clone()]).expect("arrow over 2 types");
    let arrow = |components: &[Type]| Type::arrow(components).expect("well-formed arrow");

    let constant = |value: f64| Implementation::Constant(Value::Real(value));

    let mut primitives = vec![
        registry.declare("logo_UA", tangle.clone(), constant(TAU), "Unit angle: 2 pi radians")?,
        registry.declare("logo_UL", tlength.clone(), constant(1.0), "Unit line length: 1 cm")?,
        registry.declare("logo_ZA", tangle.clone(), constant(0.0), "Zero angle: 0 radians")?,
        registry.declare("logo_ZL", tlength.clone(), constant(0.0), "Zero line length")?,
        registry.declare(
            "logo_DIVA",
            arrow(&[tangle.clone(), int.clone(), tangle.clone()]),
            Implementation::Function(diva),
            "Divide angle",
        )?,
        registry.declare(
            "logo_MULA",
            arrow(&[tangle.clone(), int.clone(), tangle.clone()]),
            Implementation::Function(mula),
            "Multiply angle",
        )?,
        registry.declare(
            "logo_DIVL",
            arrow(&[tlength.clone(), int.clone(), tlength.clone()]),
            Implementation::Function(divl),
            "Divide line length",
        )?,
        registry.declare(
            "logo_MULL",
            arrow(&[tlength.clone(), int.clone(), tlength.clone()]),
            Implementation::Function(mull),
            "Multiply line length",
        )?,
        registry.declare(
            "logo_ADDA",
            arrow(&[tangle.clone(), tangle.clone(), tangle.clone()]),
            Implementation::Function(adda),
            "Add angles",
        )?,
        registry.declare(
            "logo_SUBA",
            arrow(&[tangle.clone(), tangle.clone(), tangle.clone()]),
            Implementation::Function(suba),
            "Subtract angles",
        )?,
        registry.declare(
            "logo_PT",
            arrow(&[pen.clone(), pen.clone()]),
            Implementation::Function(pen_transform),
            "Lift pen.",
        )?,
        registry.declare(
            "logo_FWRT",
            arrow(&[tlength.clone(), tangle.clone(), turtle.clone(), turtle.clone()]),
            Implementation::Function(fwrt),
            "Move pen by length and angle.",
        )?,
        registry.declare(
            "logo_GETSET",
            arrow(&[pen, turtle.clone(), turtle.clone()]),
            Implementation::Function(getset),
            "Apply function to pen.",
        )?,
        registry.declare(
            "logo_IFTY",
            int.clone(),
            Implementation::Constant(Value::Int(i64::MAX)),
            "Integer constant of value infinity.",
        )?,
        registry.declare("logo_epsA", tangle, constant(EPSILON_ANGLE), "Epsilon angle")?,
        registry.declare("logo_epsL", tlength, constant(EPSILON_LENGTH), "Epsilon line")?,
        registry.declare(
            "logo_forLoop",
            arrow(&[
                int.clone(),
                arrow(&[int.clone(), turtle.clone(), turtle.clone()]),
                turtle.clone(),
                turtle,
            ]),
            Implementation::External,
            "For loop",
        )?,
    ];

    for digit in 0..10 {
        primitives.push(registry.declare(
            &digit.to_string(),
            int.clone(),
            Implementation::Constant(Value::Int(digit)),
            &format!("Integer constant of value {digit}"),
        )?);
    }

    Ok(primitives)
}
