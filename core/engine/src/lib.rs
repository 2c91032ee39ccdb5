//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the formula engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//! Callers normally only need `FormulaEngine`, `Context` and `Value`; the
//! parser types are re-exported for those that inspect the AST.

pub mod builtins;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod trace;
pub mod value;

// Re-export commonly used types at the crate root
pub use config::{EngineConfig, MAX_DEPTH_LIMIT};
pub use context::Context;
pub use diagnostic::{Diagnostic, DiagnosticError};
pub use engine::{format_error, FormulaEngine};
pub use error::{ConfigError, EvalResult, EvaluationError, FormulaError};
pub use evaluator::{evaluate, Evaluator};
pub use registry::{
    Arity, Category, FunctionDescriptor, FunctionImpl, FunctionRegistry, FunctionResult,
    ReturnType,
};
pub use trace::{EvaluationStep, EvaluationTrace, OperatorInfo};
pub use value::Value;

pub use formula_parser::{
    parse, parse_with_max_depth, BinaryOperator, ErrorCategory, Expression, Literal, ParseError,
    UnaryOperator,
};
