//! Parser for the canonical program text form.
//!
//! The text form is fully-parenthesised prefix notation: `(f a b)`
//! applies `f` to `a` then `b` (left-associative currying), `(lambda
//! BODY)` abstracts one variable referenced as `$0` innermost, `#EXPR`
//! names an invented production, and a bare token is resolved first as a
//! bound-variable index, then against the primitive registry, then as an
//! integer literal.
//!
//! This is the boundary format exchanged with the external solver and
//! with on-disk checkpoints, so `parse` must round-trip `Program`'s
//! `Display` output exactly.

use std::sync::Arc;

use thiserror::Error;

use crate::language::Primitive;
use crate::program::{Invented, Program, TypeCheckError};
use crate::registry::PrimitiveRegistry;
use crate::types::Type;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error at byte {position}: {reason}")]
pub struct ParseError {
    pub position: usize,
    pub reason: ParseErrorReason,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorReason {
    #[error("unclosed parenthesis")]
    UnbalancedParenthesis,
    #[error("unexpected `)`")]
    UnexpectedClose,
    #[error("empty application `()`")]
    EmptyApplication,
    #[error("unknown token `{0}`")]
    UnknownToken(String),
    #[error("variable ${index} out of scope (binder depth {depth})")]
    VariableOutOfScope { index: usize, depth: usize },
    #[error("expected end of expression, found more tokens")]
    TrailingTokens,
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("expression nesting is too deep")]
    NestingTooDeep,
    #[error("invented expression body is not typeable: {0}")]
    UninferableInvented(TypeCheckError),
}

fn fail<T>(position: usize, reason: ParseErrorReason) -> Result<T, ParseError> {
    Err(ParseError { position, reason })
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, PartialEq)]
enum TokenKind {
    LParen,
    RParen,
    Hash,
    Atom(String),
}

#[derive(Debug)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        match ch {
            '(' => {
                tokens.push(Token {
                    kind: TokenKind::LParen,
                    position,
                });
                chars.next();
            }
            ')' => {
                tokens.push(Token {
                    kind: TokenKind::RParen,
                    position,
                });
                chars.next();
            }
            '#' => {
                tokens.push(Token {
                    kind: TokenKind::Hash,
                    position,
                });
                chars.next();
            }
            ch if ch.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut atom = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '#' {
                        break;
                    }
                    atom.push(ch);
                    chars.next();
                }
                tokens.push(Token {
                    kind: TokenKind::Atom(atom),
                    position,
                });
            }
        }
    }

    tokens
}

// ============================================================================
// Parser
// ============================================================================

/// Descent recurses once per nesting level, and input text arrives from
/// untrusted checkpoint and solver sources, so nesting is bounded rather
/// than letting pathological `(((...` overflow the stack.
const MAX_NESTING: usize = 512;

struct Parser<'a> {
    registry: &'a PrimitiveRegistry,
    tokens: Vec<Token>,
    next: usize,
    end: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(registry: &'a PrimitiveRegistry, input: &str) -> Parser<'a> {
        Parser {
            registry,
            tokens: tokenize(input),
            next: 0,
            end: input.len(),
            nesting: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.next)
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |token| token.position)
    }

    /// Parse one expression under `depth` enclosing lambda binders.
    fn expression(&mut self, depth: usize) -> Result<Program, ParseError> {
        if self.nesting >= MAX_NESTING {
            return fail(self.position(), ParseErrorReason::NestingTooDeep);
        }
        self.nesting += 1;
        let result = self.expression_node(depth);
        self.nesting -= 1;
        result
    }

    fn expression_node(&mut self, depth: usize) -> Result<Program, ParseError> {
        let Some(token) = self.peek() else {
            return fail(self.end, ParseErrorReason::UnexpectedEnd);
        };
        let position = token.position;
        match &token.kind {
            TokenKind::RParen => fail(position, ParseErrorReason::UnexpectedClose),
            TokenKind::Hash => {
                self.next += 1;
                // Invented bodies are closed expressions
                let body = self.expression(0)?;
                match Invented::new(body) {
                    Ok(invented) => Ok(Program::Invented(invented)),
                    Err(cause) => fail(position, ParseErrorReason::UninferableInvented(cause)),
                }
            }
            TokenKind::Atom(atom) => {
                let atom = atom.clone();
                self.next += 1;
                self.leaf(&atom, position, depth)
            }
            TokenKind::LParen => {
                self.next += 1;
                if let Some(Token {
                    kind: TokenKind::Atom(head),
                    ..
                }) = self.peek()
                    && head == "lambda"
                {
                    self.next += 1;
                    let body = self.expression(depth + 1)?;
                    self.close(position)?;
                    return Ok(Program::Abstraction(Box::new(body)));
                }

                let mut items = Vec::new();
                loop {
                    match self.peek() {
                        None => return fail(position, ParseErrorReason::UnbalancedParenthesis),
                        Some(token) if token.kind == TokenKind::RParen => {
                            self.next += 1;
                            break;
                        }
                        Some(_) => items.push(self.expression(depth)?),
                    }
                }
                if items.is_empty() {
                    return fail(position, ParseErrorReason::EmptyApplication);
                }
                let mut items = items.into_iter();
                let function = items.next().unwrap();
                Ok(Program::apply(function, items.collect()))
            }
        }
    }

    /// Resolve a leaf token: `$index`, then registry, then integer literal.
    fn leaf(&self, atom: &str, position: usize, depth: usize) -> Result<Program, ParseError> {
        if let Some(index_text) = atom.strip_prefix('$')
            && let Ok(index) = index_text.parse::<usize>()
        {
            if index < depth {
                return Ok(Program::Index(index));
            }
            return fail(
                position,
                ParseErrorReason::VariableOutOfScope { index, depth },
            );
        }

        if let Ok(primitive) = self.registry.lookup(atom) {
            return Ok(Program::Primitive(primitive));
        }

        if let Ok(literal) = atom.parse::<i64>() {
            return Ok(Program::Primitive(self.integer_literal(literal)));
        }

        fail(position, ParseErrorReason::UnknownToken(atom.to_string()))
    }

    fn integer_literal(&self, value: i64) -> Arc<Primitive> {
        Primitive::integer_literal(value, Type::base("int"))
    }

    fn close(&mut self, open_position: usize) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::RParen => {
                self.next += 1;
                Ok(())
            }
            Some(token) => fail(token.position, ParseErrorReason::TrailingTokens),
            None => fail(open_position, ParseErrorReason::UnbalancedParenthesis),
        }
    }
}

/// Parse canonical program text against a primitive registry.
pub fn parse(registry: &PrimitiveRegistry, input: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(registry, input);
    let program = parser.expression(0)?;
    if parser.peek().is_some() {
        return fail(parser.position(), ParseErrorReason::TrailingTokens);
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Implementation, Value};

    fn registry() -> PrimitiveRegistry {
        let mut registry = PrimitiveRegistry::new();
        let int = Type::base("int");
        registry
            .declare(
                "succ",
                Type::arrow(&[int.clone(), int.clone()]).unwrap(),
                Implementation::Function(|args, _| {
                    Ok(Value::Int(crate::language::as_int(&args[0])? + 1))
                }),
                "successor",
            )
            .unwrap();
        registry
            .declare("one", int, Implementation::Constant(Value::Int(1)), "")
            .unwrap();
        registry
    }

    #[test]
    fn parses_application_spine() {
        let registry = registry();
        let program = parse(&registry, "(succ (succ one))").unwrap();
        assert_eq!(program.to_string(), "(succ (succ one))");
    }

    #[test]
    fn parses_lambda_with_index() {
        let registry = registry();
        let program = parse(&registry, "(lambda (succ $0))").unwrap();
        assert_eq!(
            program,
            Program::Abstraction(Box::new(Program::apply(
                Program::Primitive(registry.lookup("succ").unwrap()),
                vec![Program::Index(0)],
            )))
        );
    }

    #[test]
    fn out_of_scope_index_is_rejected() {
        let registry = registry();
        let failure = parse(&registry, "(lambda $1)").unwrap_err();
        assert_eq!(
            failure.reason,
            ParseErrorReason::VariableOutOfScope { index: 1, depth: 1 }
        );
    }

    #[test]
    fn unknown_token_is_rejected_with_position() {
        let registry = registry();
        let failure = parse(&registry, "(succ mystery)").unwrap_err();
        assert_eq!(failure.position, 6);
        assert_eq!(
            failure.reason,
            ParseErrorReason::UnknownToken("mystery".to_string())
        );
    }

    #[test]
    fn undeclared_integers_parse_as_literals() {
        let registry = registry();
        let program = parse(&registry, "(succ 41)").unwrap();
        assert_eq!(program.to_string(), "(succ 41)");
        assert_eq!(program.infer().unwrap(), Type::base("int"));
    }

    #[test]
    fn unbalanced_input_is_rejected() {
        let registry = registry();
        let failure = parse(&registry, "(succ one").unwrap_err();
        assert_eq!(failure.reason, ParseErrorReason::UnbalancedParenthesis);
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let registry = registry();
        let failure = parse(&registry, "one one").unwrap_err();
        assert_eq!(failure.reason, ParseErrorReason::TrailingTokens);
    }

    #[test]
    fn runaway_nesting_is_rejected_not_crashed() {
        let registry = registry();
        let text = format!("{}one{}", "(".repeat(4096), ")".repeat(4096));
        let failure = parse(&registry, &text).unwrap_err();
        assert_eq!(failure.reason, ParseErrorReason::NestingTooDeep);
    }

    #[test]
    fn invented_round_trips() {
        let registry = registry();
        let program = parse(&registry, "(#(succ one) one)").unwrap();
        assert_eq!(program.to_string(), "(#(succ one) one)");
    }
}
