//! Typed combinator language core for program-synthesis search.
//!
//! This crate defines the language substrate a wake-sleep synthesis loop
//! operates over: named, typed primitives composed by application and
//! abstraction; a canonical textual form that round-trips exactly; a
//! call-by-value interpreter with a wall-clock deadline for host-evaluable
//! programs; and the initial uniform grammar handed to the external
//! enumerator. The search iterator, recognition model, dataset loading,
//! and the external native solver are collaborators behind these
//! interfaces, not part of this crate.

pub mod domains;
pub mod grammar;
pub mod interner;
pub mod interpreter;
pub mod language;
pub mod parser;
pub mod program;
pub mod registry;
pub mod types;

// Re-export commonly used items for convenience
pub use domains::{DomainBundle, DomainError, load_primitive_sets};
pub use grammar::{Grammar, GrammarError, Production, Rule};
pub use interner::InternedSymbol;
pub use interpreter::{EvalContext, EvalError, evaluate};
pub use language::{Canvas, Implementation, NativeFn, Primitive, SceneObject, Value};
pub use parser::{ParseError, ParseErrorReason, parse};
pub use program::{Invented, Program, TypeCheckError};
pub use registry::{PrimitiveRegistry, RegistryError};
pub use types::{Type, TypeError};
