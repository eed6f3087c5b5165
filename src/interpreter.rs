//! Call-by-value evaluation of programs under a wall-clock deadline.
//!
//! The interpreter walks the AST directly: abstraction captures the de
//! Bruijn value stack as a closure, application evaluates callee then
//! argument then applies, and primitive references dispatch to their host
//! implementations, accumulating partial applications until the curried
//! arity is saturated.
//!
//! Evaluation failures are ordinary result values, not process states: a
//! search loop classifies thousands of candidates per iteration and must
//! tell "timed out" from "crashed" from "needs the external solver"
//! without any per-candidate crash handling. The deadline is re-checked and
//! the reduction depth bounded on entry to every recursive step, so a
//! non-halting candidate is cancelled cooperatively and a self-applying one
//! fails as a value instead of overflowing the host stack.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::language::{Closure, Implementation, PartialApply, Value};
use crate::program::Program;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The wall-clock deadline passed. Expected under search; many
    /// candidate programs do not halt.
    #[error("evaluation timed out")]
    Timeout,
    /// The program reaches a primitive only the external solver can
    /// execute. Raised before any partial execution.
    #[error("primitive {primitive} requires the external solver")]
    RequiresExternalSolver { primitive: String },
    /// A host implementation failed (division by zero, bad value shape,
    /// application of a non-function). Expected under search.
    #[error("runtime failure: {cause}")]
    Runtime { cause: String },
    /// The reduction nested past the interpreter's depth bound. Expected
    /// under search; self-applying candidates diverge by depth long
    /// before the wall-clock deadline.
    #[error("evaluation exceeded the depth limit")]
    DepthExceeded,
    /// Argument count handed to a primitive disagrees with its declared
    /// arity. A bug in primitive declarations, not bad input.
    #[error("{primitive}: expected {expected} arguments, got {found}")]
    ArityMismatch {
        primitive: String,
        expected: usize,
        found: usize,
    },
}

impl EvalError {
    pub(crate) fn runtime(cause: impl Into<String>) -> EvalError {
        EvalError::Runtime {
            cause: cause.into(),
        }
    }
}

// ============================================================================
// Evaluation context
// ============================================================================

/// Evaluation recurses one host stack frame per reduction step, so the
/// nesting is bounded to keep a divergent candidate from overflowing the
/// stack and taking the process down with it. Generous next to any
/// enumerated program.
const MAX_EVAL_DEPTH: usize = 1_000;

/// Per-invocation evaluation state: the deadline, the reduction depth,
/// and the application entry point handed to higher-order primitives.
///
/// Each call to [`evaluate`] owns its context; nothing is shared between
/// concurrent evaluations of different programs.
pub struct EvalContext {
    deadline: Instant,
    depth: usize,
}

impl EvalContext {
    pub fn new(timeout: Duration) -> EvalContext {
        EvalContext {
            deadline: Instant::now() + timeout,
            depth: 0,
        }
    }

    fn check_deadline(&self) -> Result<(), EvalError> {
        if Instant::now() >= self.deadline {
            Err(EvalError::Timeout)
        } else {
            Ok(())
        }
    }

    /// Entry guard for every recursive step: the deadline and the depth
    /// bound. On success the caller owes one matching depth decrement.
    fn descend(&mut self) -> Result<(), EvalError> {
        self.check_deadline()?;
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(EvalError::DepthExceeded);
        }
        self.depth += 1;
        Ok(())
    }

    /// Apply a functional value (closure or partially applied primitive)
    /// to one argument. This is the callback higher-order primitives use
    /// to run their functional arguments under the active deadline.
    pub fn apply(&mut self, function: &Value, argument: Value) -> Result<Value, EvalError> {
        self.descend()?;
        let result = self.apply_value(function, argument);
        self.depth -= 1;
        result
    }

    fn apply_value(&mut self, function: &Value, argument: Value) -> Result<Value, EvalError> {
        match function {
            Value::Closure(closure) => {
                let mut env = closure.env.clone();
                env.push(argument);
                self.eval(&closure.body, &mut env)
            }
            Value::Partial(partial) => {
                let mut args = partial.args.clone();
                args.push(argument);
                if args.len() == partial.primitive.arity() {
                    partial.primitive.apply(&args, self)
                } else {
                    Ok(Value::Partial(Arc::new(PartialApply {
                        primitive: partial.primitive.clone(),
                        args,
                    })))
                }
            }
            other => Err(EvalError::runtime(format!(
                "cannot apply non-function {other}"
            ))),
        }
    }

    fn eval(&mut self, program: &Program, env: &mut Vec<Value>) -> Result<Value, EvalError> {
        self.descend()?;
        let result = self.eval_node(program, env);
        self.depth -= 1;
        result
    }

    fn eval_node(&mut self, program: &Program, env: &mut Vec<Value>) -> Result<Value, EvalError> {
        match program {
            Program::Primitive(primitive) => match primitive.implementation() {
                Implementation::Constant(value) => Ok(value.clone()),
                Implementation::Function(_) => Ok(Value::Partial(Arc::new(PartialApply {
                    primitive: primitive.clone(),
                    args: Vec::new(),
                }))),
                Implementation::External => Err(EvalError::RequiresExternalSolver {
                    primitive: primitive.name().resolve(),
                }),
            },
            Program::Index(i) => {
                if *i < env.len() {
                    Ok(env[env.len() - 1 - i].clone())
                } else {
                    Err(EvalError::runtime(format!("unbound variable ${i}")))
                }
            }
            Program::Abstraction(body) => Ok(Value::Closure(Arc::new(Closure {
                body: (**body).clone(),
                env: env.clone(),
            }))),
            Program::Application(function, argument) => {
                let function = self.eval(function, env)?;
                let argument = self.eval(argument, env)?;
                self.apply(&function, argument)
            }
            // Invented expressions are closed
            Program::Invented(invented) => self.eval(&invented.body, &mut Vec::new()),
        }
    }
}

/// Evaluate a program against top-level argument values under a
/// wall-clock timeout.
///
/// Any reachable external-solver-only primitive fails the whole program
/// with [`EvalError::RequiresExternalSolver`] before execution starts;
/// there is no meaningful partial result once such a construct is
/// reached.
pub fn evaluate(
    program: &Program,
    args: &[Value],
    timeout: Duration,
) -> Result<Value, EvalError> {
    if let Some(external) = program.first_external() {
        return Err(EvalError::RequiresExternalSolver {
            primitive: external.name().resolve(),
        });
    }

    let mut ctx = EvalContext::new(timeout);
    let mut env = Vec::new();
    let mut value = ctx.eval(program, &mut env)?;
    for arg in args {
        value = ctx.apply(&value, arg.clone())?;
    }
    Ok(value)
}
