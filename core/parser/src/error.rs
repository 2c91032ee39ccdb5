//! FILENAME: core/parser/src/error.rs
//! PURPOSE: Lexer and parser error types.
//! CONTEXT: Presentation layers map `ErrorCategory` to user-facing hints,
//! so the set of categories and their string forms must stay stable.

use serde::Serialize;
use thiserror::Error;

/// Classification of a syntax failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Generic malformed construct.
    Syntax,
    UnbalancedParentheses,
    UnexpectedToken,
    EmptyExpression,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 4] = [
        ErrorCategory::Syntax,
        ErrorCategory::UnbalancedParentheses,
        ErrorCategory::UnexpectedToken,
        ErrorCategory::EmptyExpression,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::UnbalancedParentheses => "unbalanced-parentheses",
            ErrorCategory::UnexpectedToken => "unexpected-token",
            ErrorCategory::EmptyExpression => "empty-expression",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while scanning characters into tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Malformed number '{text}' at position {position}")]
    MalformedNumber { text: String, position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnterminatedString { position }
            | LexError::UnexpectedCharacter { position, .. }
            | LexError::MalformedNumber { position, .. } => *position,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LexError::UnexpectedCharacter { .. } => ErrorCategory::UnexpectedToken,
            LexError::UnterminatedString { .. } | LexError::MalformedNumber { .. } => {
                ErrorCategory::Syntax
            }
        }
    }
}

/// Parser errors with descriptive messages.
#[derive(Error, Debug, PartialEq, Clone)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub category: ErrorCategory,
    pub message: String,
    pub position: Option<usize>,
}

impl ParseError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        ParseError {
            category,
            message: message.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.category(), err.to_string()).at(err.position())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
