//! FILENAME: core/engine/src/diagnostic.rs
//! PURPOSE: The result of validating a formula without evaluating it.

use formula_parser::{ErrorCategory, Expression};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticError {
    /// User-facing message, already passed through the error formatter.
    pub message: String,
    pub category: ErrorCategory,
    /// Character offset of the problem, when one is known.
    pub position: Option<usize>,
}

/// Validation outcome. Exactly one of `ast` and `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub valid: bool,
    pub ast: Option<Expression>,
    pub error: Option<DiagnosticError>,
}

impl Diagnostic {
    pub fn success(ast: Expression) -> Self {
        Diagnostic {
            valid: true,
            ast: Some(ast),
            error: None,
        }
    }

    pub fn failure(message: String, category: ErrorCategory, position: Option<usize>) -> Self {
        Diagnostic {
            valid: false,
            ast: None,
            error: Some(DiagnosticError {
                message,
                category,
                position,
            }),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        self.error.as_ref().map(|e| e.category)
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}
