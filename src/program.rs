//! The program abstract syntax: primitive references, de Bruijn indices,
//! applications, abstractions, and invented (learned) expressions.
//!
//! Programs are immutable trees. Each tree owns its children exclusively;
//! primitive and invented nodes hold shared references into the registry
//! or the learner's invention store. The canonical text form is
//! fully-parenthesised prefix notation with flat application spines:
//! `(f a b)`, `(lambda $0)`, `#(logo_MULA logo_UA 2)`.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::language::Primitive;
use crate::types::{Arrow, Type};

// ============================================================================
// AST
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Program {
    /// Reference to a registered (or literal) primitive.
    Primitive(Arc<Primitive>),
    /// De Bruijn index into the enclosing abstractions, `$0` innermost.
    Index(usize),
    /// Application of a function-position subtree to one argument.
    Application(Box<Program>, Box<Program>),
    /// One-variable abstraction over a body.
    Abstraction(Box<Program>),
    /// A compound expression previously discovered by the learner, used
    /// as an opaque typed leaf.
    Invented(Arc<Invented>),
}

/// A learned compound expression with its own type.
#[derive(Debug, Clone, PartialEq)]
pub struct Invented {
    pub body: Program,
    pub tp: Type,
}

impl Invented {
    /// Wrap a closed, inferable body as an invented production.
    pub fn new(body: Program) -> Result<Arc<Invented>, TypeCheckError> {
        let tp = body.infer()?;
        Ok(Arc::new(Invented { body, tp }))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeCheckError {
    /// An application's argument type disagrees with the callee's next
    /// curried parameter type. `location` is the offending subexpression
    /// in canonical text form.
    #[error("type mismatch at {location}: expected {expected}, found {found}")]
    Mismatch {
        expected: Type,
        found: Type,
        location: String,
    },
    /// Applying an expression of base type.
    #[error("cannot apply non-function of type {tp} at {location}")]
    NotAFunction { tp: Type, location: String },
    /// A de Bruijn index with no enclosing abstraction to bind it.
    #[error("unbound variable ${0}")]
    UnboundIndex(usize),
    /// A bare abstraction in a position where no type is expected; the
    /// monomorphic surface cannot synthesise a binder type from nothing.
    #[error("cannot infer the type of a lambda without an expected type")]
    CannotInfer,
    /// An abstraction checked against a base type.
    #[error("lambda cannot have non-function type {expected} at {location}")]
    LambdaAgainstBase { expected: Type, location: String },
}

impl Program {
    /// Convenience constructor for an application spine: `f a b ...`.
    pub fn apply(function: Program, args: Vec<Program>) -> Program {
        args.into_iter().fold(function, |f, x| {
            Program::Application(Box::new(f), Box::new(x))
        })
    }

    /// Whether every reachable primitive (including inside invented
    /// bodies) has a host implementation. A single external-solver-only
    /// construct makes the whole program non-host-evaluable.
    pub fn is_host_evaluable(&self) -> bool {
        self.first_external().is_none()
    }

    /// The first reachable external-solver-only primitive, if any.
    pub fn first_external(&self) -> Option<&Arc<Primitive>> {
        match self {
            Program::Primitive(primitive) => {
                (!primitive.is_host_evaluable()).then_some(primitive)
            }
            Program::Index(_) => None,
            Program::Application(function, argument) => function
                .first_external()
                .or_else(|| argument.first_external()),
            Program::Abstraction(body) => body.first_external(),
            Program::Invented(invented) => invented.body.first_external(),
        }
    }

    // ------------------------------------------------------------------------
    // Type checking
    // ------------------------------------------------------------------------

    /// Synthesise the type of a closed program bottom-up.
    ///
    /// Bare abstractions have no bottom-up type in a monomorphic surface;
    /// check those against an expected type with [`Program::check`]. An
    /// abstraction applied to an inferable argument (a beta-redex) is the
    /// exception: its binder type comes from the argument.
    pub fn infer(&self) -> Result<Type, TypeCheckError> {
        self.infer_in(&mut Vec::new())
    }

    /// Check the program against an expected type, pushing arrow argument
    /// types through lambda binders.
    pub fn check(&self, expected: &Type) -> Result<(), TypeCheckError> {
        self.check_in(expected, &mut Vec::new())
    }

    fn infer_in(&self, env: &mut Vec<Type>) -> Result<Type, TypeCheckError> {
        match self {
            Program::Primitive(primitive) => Ok(primitive.tp().clone()),
            Program::Invented(invented) => Ok(invented.tp.clone()),
            Program::Index(i) => {
                if *i < env.len() {
                    Ok(env[env.len() - 1 - i].clone())
                } else {
                    Err(TypeCheckError::UnboundIndex(*i))
                }
            }
            Program::Abstraction(_) => Err(TypeCheckError::CannotInfer),
            Program::Application(function, argument) => {
                // A beta-redex has no synthesisable function type; infer
                // the argument and push it through the binder instead.
                // Search rewrites produce these.
                if let Program::Abstraction(body) = function.as_ref() {
                    let argument_tp = argument.infer_in(env)?;
                    env.push(argument_tp);
                    let result = body.infer_in(env);
                    env.pop();
                    return result;
                }
                let function_tp = function.infer_in(env)?;
                let Type::Arrow(arrow) = &function_tp else {
                    return Err(TypeCheckError::NotAFunction {
                        tp: function_tp.clone(),
                        location: self.to_string(),
                    });
                };
                argument.check_in(&arrow.argument, env)?;
                Ok(arrow.result.clone())
            }
        }
    }

    fn check_in(&self, expected: &Type, env: &mut Vec<Type>) -> Result<(), TypeCheckError> {
        match (self, expected) {
            (Program::Abstraction(body), Type::Arrow(arrow)) => {
                let Arrow { argument, result } = arrow.as_ref();
                env.push(argument.clone());
                let checked = body.check_in(result, env);
                env.pop();
                checked
            }
            (Program::Abstraction(_), _) => Err(TypeCheckError::LambdaAgainstBase {
                expected: expected.clone(),
                location: self.to_string(),
            }),
            _ => {
                let found = self.infer_in(env)?;
                if &found == expected {
                    Ok(())
                } else {
                    Err(TypeCheckError::Mismatch {
                        expected: expected.clone(),
                        found,
                        location: self.to_string(),
                    })
                }
            }
        }
    }

    fn show(&self, f: &mut fmt::Formatter<'_>, is_function: bool) -> fmt::Result {
        match self {
            Program::Primitive(primitive) => write!(f, "{}", primitive.name()),
            Program::Index(i) => write!(f, "${i}"),
            Program::Invented(invented) => {
                write!(f, "#")?;
                invented.body.show(f, false)
            }
            Program::Abstraction(body) => {
                write!(f, "(lambda ")?;
                body.show(f, false)?;
                write!(f, ")")
            }
            Program::Application(function, argument) => {
                if !is_function {
                    write!(f, "(")?;
                }
                function.show(f, true)?;
                write!(f, " ")?;
                argument.show(f, false)?;
                if !is_function {
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.show(f, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Implementation, Value};
    use crate::interner::InternedSymbol;

    fn prim(name: &str, tp: Type) -> Arc<Primitive> {
        Arc::new(Primitive::new(
            InternedSymbol::new(name),
            tp,
            Implementation::Constant(Value::Int(0)),
            "",
        ))
    }

    #[test]
    fn application_spines_print_flat() {
        let int = Type::base("int");
        let plus = prim(
            "plus",
            Type::arrow(&[int.clone(), int.clone(), int.clone()]).unwrap(),
        );
        let one = prim("one", int);
        let p = Program::apply(
            Program::Primitive(plus),
            vec![
                Program::Primitive(one.clone()),
                Program::Primitive(one),
            ],
        );
        assert_eq!(p.to_string(), "(plus one one)");
    }

    #[test]
    fn abstraction_prints_de_bruijn_body() {
        let p = Program::Abstraction(Box::new(Program::Index(0)));
        assert_eq!(p.to_string(), "(lambda $0)");
    }

    #[test]
    fn unbound_index_is_rejected() {
        let p = Program::Abstraction(Box::new(Program::Index(1)));
        let tp = Type::arrow(&[Type::base("int"), Type::base("int")]).unwrap();
        assert_eq!(p.check(&tp), Err(TypeCheckError::UnboundIndex(1)));
    }

    #[test]
    fn identity_checks_against_arrow() {
        let p = Program::Abstraction(Box::new(Program::Index(0)));
        let tp = Type::arrow(&[Type::base("int"), Type::base("int")]).unwrap();
        assert_eq!(p.check(&tp), Ok(()));
    }

    #[test]
    fn bare_lambda_cannot_be_synthesised() {
        let p = Program::Abstraction(Box::new(Program::Index(0)));
        assert_eq!(p.infer(), Err(TypeCheckError::CannotInfer));
    }

    #[test]
    fn beta_redex_infers_through_its_argument() {
        let one = prim("one", Type::base("int"));
        let redex = Program::apply(
            Program::Abstraction(Box::new(Program::Index(0))),
            vec![Program::Primitive(one)],
        );
        assert_eq!(redex.infer(), Ok(Type::base("int")));
    }

    #[test]
    fn beta_redex_with_lambda_argument_stays_uninferable() {
        let identity = || Program::Abstraction(Box::new(Program::Index(0)));
        let redex = Program::apply(identity(), vec![identity()]);
        assert_eq!(redex.infer(), Err(TypeCheckError::CannotInfer));
    }
}
