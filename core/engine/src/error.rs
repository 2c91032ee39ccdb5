//! FILENAME: core/engine/src/error.rs
//! PURPOSE: Error types raised by evaluation and by the engine facade.

use crate::engine::format_error;
use crate::registry::Arity;
use formula_parser::ErrorCategory;
use thiserror::Error;

/// Failures raised while walking an AST.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Undefined symbol {name}")]
    UnknownIdentifier { name: String },

    #[error("Unknown function {name}")]
    UnknownFunction { name: String },

    #[error("Function {name} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        actual: usize,
    },

    #[error("Type mismatch in {operation}: needs {expected}, got {actual}")]
    TypeMismatch {
        operation: String,
        expected: String,
        actual: String,
    },

    /// Raised by a function implementation for an argument outside its domain.
    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },
}

impl EvaluationError {
    pub fn type_mismatch(
        operation: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        EvaluationError::TypeMismatch {
            operation: operation.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        EvaluationError::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }
}

pub type EvalResult<T> = Result<T, EvaluationError>;

/// Errors surfaced by `FormulaEngine::evaluate_formula`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    /// The formula failed validation; the message is already user-facing.
    #[error("{message}")]
    Invalid {
        message: String,
        category: ErrorCategory,
    },

    /// Displayed through `format_error`, like validation messages.
    #[error("Evaluation error: {}", format_error(&.0.to_string()))]
    Evaluation(#[from] EvaluationError),
}

impl FormulaError {
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            FormulaError::Invalid { category, .. } => Some(*category),
            FormulaError::Evaluation(_) => None,
        }
    }
}

/// Failures loading configuration or contexts from JSON.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid context: {0}")]
    InvalidContext(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
