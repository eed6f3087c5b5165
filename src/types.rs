//! The type language: named base types and curried arrow types.
//!
//! Types are built once at domain-assembly time and shared by reference
//! (`Arc`) across every primitive and program node that mentions them.
//! Equality is structural: base types are equal iff they carry the same
//! name, arrows iff argument and result agree recursively.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::interner::InternedSymbol;

// ============================================================================
// Type
// ============================================================================

/// A type of the combinator language.
///
/// The enum is non-exhaustive so type variables can be added later without
/// breaking downstream matches; the current surface is monomorphic.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A named atomic type, e.g. `int`, `tangle`, `turtle`.
    Base(InternedSymbol),
    /// A single curried arrow. Multi-argument function types are
    /// right-nested chains of these.
    Arrow(Arc<Arrow>),
}

/// One step of a curried function type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arrow {
    pub argument: Type,
    pub result: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// `arrow` needs at least one argument type and a return type.
    #[error("arrow type requires at least 2 component types, got {supplied}")]
    Arity { supplied: usize },
    /// `arguments`/`returns` called on a base type.
    #[error("not a function type: {0}")]
    NotAFunctionType(Type),
}

impl Type {
    /// The base type named `name`.
    pub fn base(name: &str) -> Type {
        Type::Base(InternedSymbol::new(name))
    }

    /// The curried function type over `components`, where the last element
    /// is the return type and the rest are argument types in order.
    pub fn arrow(components: &[Type]) -> Result<Type, TypeError> {
        if components.len() < 2 {
            return Err(TypeError::Arity {
                supplied: components.len(),
            });
        }
        let mut tp = components[components.len() - 1].clone();
        for argument in components[..components.len() - 1].iter().rev() {
            tp = Type::Arrow(Arc::new(Arrow {
                argument: argument.clone(),
                result: tp,
            }));
        }
        Ok(tp)
    }

    /// The argument types of an arrow, outermost first.
    pub fn arguments(&self) -> Result<Vec<&Type>, TypeError> {
        match self {
            Type::Base(_) => Err(TypeError::NotAFunctionType(self.clone())),
            Type::Arrow(_) => {
                let mut arguments = Vec::new();
                let mut tp = self;
                while let Type::Arrow(arrow) = tp {
                    arguments.push(&arrow.argument);
                    tp = &arrow.result;
                }
                Ok(arguments)
            }
        }
    }

    /// The final return type of an arrow.
    pub fn returns(&self) -> Result<&Type, TypeError> {
        match self {
            Type::Base(_) => Err(TypeError::NotAFunctionType(self.clone())),
            Type::Arrow(_) => {
                let mut tp = self;
                while let Type::Arrow(arrow) = tp {
                    tp = &arrow.result;
                }
                Ok(tp)
            }
        }
    }

    /// Number of curried arguments: 0 for base types.
    pub fn arity(&self) -> usize {
        let mut arity = 0;
        let mut tp = self;
        while let Type::Arrow(arrow) = tp {
            arity += 1;
            tp = &arrow.result;
        }
        arity
    }

    /// The return type when applied to exactly `arity()` arguments, or the
    /// type itself for base types. Never fails, unlike [`Type::returns`].
    pub fn final_type(&self) -> &Type {
        self.returns().unwrap_or(self)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Base(name) => write!(f, "{name}"),
            Type::Arrow(arrow) => {
                // Parenthesise arrows in argument position
                match arrow.argument {
                    Type::Arrow(_) => write!(f, "({}) -> {}", arrow.argument, arrow.result),
                    _ => write!(f, "{} -> {}", arrow.argument, arrow.result),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_equality_is_by_name() {
        assert_eq!(Type::base("tangle"), Type::base("tangle"));
        assert_ne!(Type::base("tangle"), Type::base("tlength"));
    }

    #[test]
    fn arrow_is_curried() {
        let abc = Type::arrow(&[Type::base("a"), Type::base("b"), Type::base("c")]).unwrap();
        let bc = Type::arrow(&[Type::base("b"), Type::base("c")]).unwrap();
        let nested = Type::arrow(&[Type::base("a"), bc]).unwrap();
        assert_eq!(abc, nested);
    }

    #[test]
    fn arrow_arity_error() {
        assert_eq!(
            Type::arrow(&[Type::base("a")]),
            Err(TypeError::Arity { supplied: 1 })
        );
        assert_eq!(Type::arrow(&[]), Err(TypeError::Arity { supplied: 0 }));
    }

    #[test]
    fn arguments_and_returns() {
        let tp = Type::arrow(&[Type::base("tangle"), Type::base("int"), Type::base("tangle")])
            .unwrap();
        assert_eq!(
            tp.arguments().unwrap(),
            vec![&Type::base("tangle"), &Type::base("int")]
        );
        assert_eq!(tp.returns().unwrap(), &Type::base("tangle"));
        assert_eq!(tp.arity(), 2);
    }

    #[test]
    fn base_types_are_not_function_types() {
        let int = Type::base("int");
        assert!(matches!(
            int.arguments(),
            Err(TypeError::NotAFunctionType(_))
        ));
        assert!(matches!(int.returns(), Err(TypeError::NotAFunctionType(_))));
        assert_eq!(int.arity(), 0);
    }

    #[test]
    fn display_parenthesises_argument_arrows() {
        let turtle = Type::base("turtle");
        let pen = Type::arrow(&[turtle.clone(), turtle.clone()]).unwrap();
        let tp = Type::arrow(&[pen.clone(), turtle.clone(), turtle]).unwrap();
        assert_eq!(tp.to_string(), "(turtle -> turtle) -> turtle -> turtle");
    }
}
