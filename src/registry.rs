//! The per-domain primitive registry.
//!
//! A registry scopes the primitive vocabulary of one loaded domain
//! configuration. It is passed explicitly to the parser and domain
//! assembly rather than living in a process-wide singleton, so several
//! domains can coexist in one process (notably under test).

use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::interner::InternedSymbol;
use crate::language::{Implementation, Primitive};
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Declaring a second primitive under an already-registered name.
    #[error("duplicate primitive name: {0}")]
    DuplicateName(String),
    /// Looking up a name nothing declared.
    #[error("unknown primitive: {0}")]
    UnknownPrimitive(String),
    /// A constant implementation on an arrow type, or a function
    /// implementation on a base type. Caught eagerly at declaration, not
    /// at first use.
    #[error("primitive {name}: {kind} implementation does not fit type {tp}")]
    ImplementationShape {
        name: String,
        kind: &'static str,
        tp: Type,
    },
}

/// Registry of the primitives available to one domain.
///
/// Iteration order over [`PrimitiveRegistry::primitives`] is declaration
/// order, which downstream grammar construction relies on for
/// determinism.
#[derive(Debug, Default)]
pub struct PrimitiveRegistry {
    by_name: FxHashMap<InternedSymbol, Arc<Primitive>>,
    order: Vec<Arc<Primitive>>,
}

impl PrimitiveRegistry {
    pub fn new() -> PrimitiveRegistry {
        PrimitiveRegistry::default()
    }

    /// Register a new primitive.
    ///
    /// Re-declaring an identical primitive (same name, same type) returns
    /// the existing record, so overlapping primitive sets of one domain
    /// can be loaded together; a same-name declaration with a different
    /// type is a [`RegistryError::DuplicateName`].
    pub fn declare(
        &mut self,
        name: &str,
        tp: Type,
        implementation: Implementation,
        comment: &str,
    ) -> Result<Arc<Primitive>, RegistryError> {
        match (&implementation, &tp) {
            (Implementation::Constant(_), Type::Arrow(_)) => {
                return Err(RegistryError::ImplementationShape {
                    name: name.to_string(),
                    kind: "constant",
                    tp,
                });
            }
            (Implementation::Function(_), Type::Base(_)) => {
                return Err(RegistryError::ImplementationShape {
                    name: name.to_string(),
                    kind: "function",
                    tp,
                });
            }
            _ => {}
        }

        let symbol = InternedSymbol::new(name);
        if let Some(existing) = self.by_name.get(&symbol) {
            if existing.tp() == &tp {
                return Ok(existing.clone());
            }
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let primitive = Arc::new(Primitive::new(symbol, tp, implementation, comment));
        self.by_name.insert(symbol, primitive.clone());
        self.order.push(primitive.clone());
        debug!("declared primitive {name} : {}", primitive.tp());
        Ok(primitive)
    }

    /// Look up a primitive by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<Primitive>, RegistryError> {
        self.by_name
            .get(&InternedSymbol::new(name))
            .cloned()
            .ok_or_else(|| RegistryError::UnknownPrimitive(name.to_string()))
    }

    /// Whether a name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&InternedSymbol::new(name))
    }

    /// All declarations, in declaration order.
    pub fn primitives(&self) -> &[Arc<Primitive>] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Value;

    #[test]
    fn declare_then_lookup() {
        let mut registry = PrimitiveRegistry::new();
        let tangle = Type::base("tangle");
        registry
            .declare(
                "logo_ZA",
                tangle.clone(),
                Implementation::Constant(Value::Real(0.0)),
                "Zero angle: 0 radians",
            )
            .unwrap();
        let found = registry.lookup("logo_ZA").unwrap();
        assert_eq!(found.tp(), &tangle);
        assert_eq!(found.arity(), 0);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = PrimitiveRegistry::new();
        registry
            .declare(
                "logo_UA",
                Type::base("tangle"),
                Implementation::Constant(Value::Real(1.0)),
                "",
            )
            .unwrap();
        let duplicate = registry.declare(
            "logo_UA",
            Type::base("tlength"),
            Implementation::Constant(Value::Real(1.0)),
            "",
        );
        assert_eq!(
            duplicate,
            Err(RegistryError::DuplicateName("logo_UA".to_string()))
        );
    }

    #[test]
    fn identical_redeclaration_reuses_the_record() {
        let mut registry = PrimitiveRegistry::new();
        let first = registry
            .declare(
                "logo_UL",
                Type::base("tlength"),
                Implementation::Constant(Value::Real(1.0)),
                "",
            )
            .unwrap();
        let second = registry
            .declare(
                "logo_UL",
                Type::base("tlength"),
                Implementation::Constant(Value::Real(1.0)),
                "",
            )
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_lookup_fails() {
        let registry = PrimitiveRegistry::new();
        assert_eq!(
            registry.lookup("logo_missing"),
            Err(RegistryError::UnknownPrimitive("logo_missing".to_string()))
        );
    }

    #[test]
    fn constant_on_arrow_type_is_rejected_eagerly() {
        let mut registry = PrimitiveRegistry::new();
        let tp = Type::arrow(&[Type::base("int"), Type::base("int")]).unwrap();
        let declared = registry.declare(
            "bad",
            tp,
            Implementation::Constant(Value::Int(0)),
            "",
        );
        assert!(matches!(
            declared,
            Err(RegistryError::ImplementationShape { kind: "constant", .. })
        ));
    }
}
