//! Domain assembly: primitive-set selection by identifier.
//!
//! A run configuration names one or more primitive sets (e.g.
//! `clevr_bootstrap clevr_map_transform`); loading them populates a fresh
//! per-run registry and yields the primitive list the initial grammar is
//! built over. Unknown identifiers fail fast at startup.

use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::grammar::{Grammar, GrammarError};
use crate::language::Primitive;
use crate::registry::{PrimitiveRegistry, RegistryError};

pub mod clevr;
pub mod logo;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("unknown primitive set: {0}")]
    UnknownPrimitiveSet(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The outcome of loading a primitive-set configuration: the registry the
/// parser resolves names against, and the primitive list (in load order,
/// duplicates across overlapping sets removed) for grammar construction.
#[derive(Debug)]
pub struct DomainBundle {
    pub registry: PrimitiveRegistry,
    pub primitives: Vec<Arc<Primitive>>,
}

impl DomainBundle {
    /// The initial uniform grammar over the loaded primitives.
    pub fn initial_grammar(&self) -> Result<Grammar, GrammarError> {
        Grammar::uniform_over_primitives(&self.primitives)
    }
}

/// Load the named primitive sets into one registry.
pub fn load_primitive_sets(identifiers: &[&str]) -> Result<DomainBundle, DomainError> {
    let mut registry = PrimitiveRegistry::new();
    let mut primitives: Vec<Arc<Primitive>> = Vec::new();
    for identifier in identifiers {
        let declared = match *identifier {
            "logo" => logo::declare_primitives(&mut registry)?,
            "clevr_bootstrap" => clevr::declare_bootstrap(&mut registry)?,
            "clevr_map_transform" => clevr::declare_map_transform(&mut registry)?,
            "clevr_filter" => clevr::declare_filter(&mut registry)?,
            "clevr_difference" => clevr::declare_difference(&mut registry)?,
            unknown => return Err(DomainError::UnknownPrimitiveSet(unknown.to_string())),
        };
        debug!("loaded primitive set {identifier}: {} primitives", declared.len());
        for primitive in declared {
            if !primitives.contains(&primitive) {
                primitives.push(primitive);
            }
        }
    }
    Ok(DomainBundle {
        registry,
        primitives,
    })
}
