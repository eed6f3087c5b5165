//! The search grammar: a weighted collection of productions handed to the
//! external enumerator.
//!
//! This core only constructs the initial uniform distribution over a
//! primitive set; the external learner replaces the grammar wholesale
//! between search iterations and never mutates one in place.

use std::fmt;
use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::language::Primitive;
use crate::program::{Invented, Program};
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    /// A grammar with no productions cannot generate any program; always
    /// a configuration error, never a legitimate empty search space.
    #[error("cannot build a grammar from an empty primitive set")]
    EmptyPrimitiveSet,
    /// The same production supplied twice.
    #[error("duplicate production: {0}")]
    DuplicateRule(String),
}

/// One production: a primitive or an invented expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Primitive(Arc<Primitive>),
    Invented(Arc<Invented>),
}

impl Rule {
    pub fn tp(&self) -> &Type {
        match self {
            Rule::Primitive(primitive) => primitive.tp(),
            Rule::Invented(invented) => &invented.tp,
        }
    }

    /// The production as a program leaf.
    pub fn to_program(&self) -> Program {
        match self {
            Rule::Primitive(primitive) => Program::Primitive(primitive.clone()),
            Rule::Invented(invented) => Program::Invented(invented.clone()),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_program())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub log_probability: f64,
    pub rule: Rule,
}

/// A weighted set of productions used as the prior of the enumerative
/// search. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    productions: Vec<Production>,
}

impl Grammar {
    /// The uniform grammar over `rules`: every production gets
    /// log-probability −ln(N). Input order is preserved for determinism.
    pub fn uniform(rules: Vec<Rule>) -> Result<Grammar, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::EmptyPrimitiveSet);
        }
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].contains(rule) {
                return Err(GrammarError::DuplicateRule(rule.to_string()));
            }
        }
        let log_probability = -(rules.len() as f64).ln();
        let productions = rules
            .into_iter()
            .map(|rule| Production {
                log_probability,
                rule,
            })
            .collect::<Vec<_>>();
        debug!(
            "built uniform grammar: {} productions at log-probability {log_probability:.4}",
            productions.len()
        );
        Ok(Grammar { productions })
    }

    /// The uniform grammar over a whole primitive list.
    pub fn uniform_over_primitives(
        primitives: &[Arc<Primitive>],
    ) -> Result<Grammar, GrammarError> {
        Grammar::uniform(
            primitives
                .iter()
                .map(|primitive| Rule::Primitive(primitive.clone()))
                .collect(),
        )
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// Productions whose return type matches `request` (the type itself
    /// for base-typed productions) — the expansions of an empty typed
    /// hole. Order is the production order, which is deterministic.
    pub fn productions_of_type(&self, request: &Type) -> Vec<&Production> {
        self.productions
            .iter()
            .filter(|production| production.rule.tp().final_type() == request)
            .collect()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(
                f,
                "{:.4}\t{}\t{}",
                production.log_probability,
                production.rule.tp(),
                production.rule
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Implementation, Value};
    use crate::registry::PrimitiveRegistry;

    fn rules(names: &[&str]) -> Vec<Rule> {
        let mut registry = PrimitiveRegistry::new();
        names
            .iter()
            .map(|name| {
                Rule::Primitive(
                    registry
                        .declare(
                            name,
                            Type::base("int"),
                            Implementation::Constant(Value::Int(0)),
                            "",
                        )
                        .unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn uniform_assigns_log_inverse_count() {
        let grammar = Grammar::uniform(rules(&["ga", "gb", "gc", "gd"])).unwrap();
        assert_eq!(grammar.len(), 4);
        for production in grammar.productions() {
            assert!((production.log_probability - (-(4f64).ln())).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_set_is_a_configuration_error() {
        assert_eq!(
            Grammar::uniform(Vec::new()),
            Err(GrammarError::EmptyPrimitiveSet)
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut rules = rules(&["ge"]);
        rules.push(rules[0].clone());
        assert_eq!(
            Grammar::uniform(rules),
            Err(GrammarError::DuplicateRule("ge".to_string()))
        );
    }
}
