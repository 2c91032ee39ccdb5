//! FILENAME: core/engine/src/trace.rs
//! PURPOSE: Report types for step-by-step evaluation and precedence checks.
//! CONTEXT: Produced by `FormulaEngine::evaluation_steps` and
//! `FormulaEngine::check_precedence` for formula debugging panels.

use crate::value::Value;
use formula_parser::{Associativity, BinaryOperator};
use serde::Serialize;

/// One intermediate result, recorded after an operator or function call
/// has been evaluated. Steps are numbered from 1 in post-order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationStep {
    pub step: usize,
    pub description: String,
    /// The sub-expression, rendered back to formula text.
    pub expression: String,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationTrace {
    pub steps: Vec<EvaluationStep>,
    pub result: Option<Value>,
    pub valid: bool,
    pub error: Option<String>,
}

/// The root operator of a formula and how it binds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorInfo {
    pub valid: bool,
    /// None when the root is not a binary operator (a literal, call, ...).
    pub operator: Option<String>,
    pub precedence: Option<u8>,
    pub left_associative: Option<bool>,
    pub error: Option<String>,
}

impl OperatorInfo {
    pub(crate) fn for_operator(op: BinaryOperator) -> Self {
        OperatorInfo {
            valid: true,
            operator: Some(op.to_string()),
            precedence: Some(op.precedence()),
            left_associative: Some(op.associativity() == Associativity::Left),
            error: None,
        }
    }

    pub(crate) fn no_operator() -> Self {
        OperatorInfo {
            valid: true,
            operator: None,
            precedence: None,
            left_associative: None,
            error: None,
        }
    }

    pub(crate) fn invalid(message: String) -> Self {
        OperatorInfo {
            valid: false,
            operator: None,
            precedence: None,
            left_associative: None,
            error: Some(message),
        }
    }
}
