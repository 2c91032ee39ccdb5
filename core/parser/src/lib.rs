//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the BODMAS formula parser.
//! CONTEXT: This module exposes the lexer, parser, and AST components
//! needed to convert formula strings into evaluatable expression trees.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST --> Evaluator
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, /, %, ^ (power, right-associative)
//! - Comparison: ==, !=, <, >, <=, >=
//! - Logic: &&, ||, ! (also spelled and, or, not)
//! - Identifiers: revenue, unit_cost
//! - Function calls: SUM(1, 2), IF(x > 0, "yes", "no")
//! - List literals: [1, 2, 3]
//! - Parentheses for grouping
//! - Unary negation: -5

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

// Register the separate tests module
#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use ast::{Associativity, BinaryOperator, Expression, Literal, UnaryOperator};
pub use error::{ErrorCategory, LexError, ParseError, ParseResult};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, parse_with_max_depth, Parser, DEFAULT_MAX_DEPTH};
pub use token::{Operator, Token, TokenKind};
