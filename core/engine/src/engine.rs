//! FILENAME: core/engine/src/engine.rs
//! PURPOSE: The facade consumed by editors and tooling.
//! CONTEXT: A FormulaEngine owns a function registry (built-ins plus any
//! caller overrides) and the engine limits. It is immutable after
//! construction, so one engine can serve many threads.
//!
//! CAPABILITIES:
//! - validate_expression: tokenize + parse only, never evaluates
//! - evaluate_formula: validate, then evaluate against a Context
//! - function catalog queries for palettes and autocomplete
//! - check_precedence / evaluation_steps for formula debugging

use crate::config::EngineConfig;
use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::error::FormulaError;
use crate::evaluator::Evaluator;
use crate::registry::{Category, FunctionDescriptor, FunctionRegistry};
use crate::trace::{EvaluationStep, EvaluationTrace, OperatorInfo};
use crate::value::Value;
use formula_parser::{parse_with_max_depth, ErrorCategory, Expression};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

#[derive(Debug, Clone)]
pub struct FormulaEngine {
    registry: FunctionRegistry,
    config: EngineConfig,
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaEngine {
    /// An engine with the built-in catalog and default limits.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), Vec::new())
    }

    /// Built-ins plus `functions`; a custom function replaces a built-in of
    /// the same name.
    pub fn with_functions(functions: impl IntoIterator<Item = FunctionDescriptor>) -> Self {
        Self::with_config(EngineConfig::default(), functions)
    }

    /// Built-ins plus `functions` under `config`. Limits outside the accepted
    /// range are clamped rather than rejected.
    pub fn with_config(
        config: EngineConfig,
        functions: impl IntoIterator<Item = FunctionDescriptor>,
    ) -> Self {
        let requested = config.clone();
        let config = config.clamped();
        if config != requested {
            log::warn!(
                "engine limits clamped: max depth {} -> {}, max nodes {} -> {}",
                requested.max_depth,
                config.max_depth,
                requested.max_nodes,
                config.max_nodes
            );
        }

        let mut registry = FunctionRegistry::with_builtins();
        let builtin_count = registry.len();

        let mut overrides = 0;
        for descriptor in functions {
            if let Some(previous) = registry.register(descriptor) {
                log::debug!("custom function overrides built-in {}", previous.name);
                overrides += 1;
            }
        }

        log::debug!(
            "formula engine ready: {} functions ({} built-in, {} overridden), max depth {}, max nodes {}",
            registry.len(),
            builtin_count,
            overrides,
            config.max_depth,
            config.max_nodes
        );

        FormulaEngine { registry, config }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // VALIDATION & EVALUATION
    // ========================================================================

    /// Checks that a formula is syntactically valid. Never evaluates and
    /// never panics; every failure is reported in the Diagnostic.
    pub fn validate_expression(&self, formula: &str) -> Diagnostic {
        let ast = match parse_with_max_depth(formula, self.config.max_depth) {
            Ok(ast) => ast,
            Err(err) => {
                let message = format_error(&err.to_string());
                log::debug!("formula rejected ({}): {}", err.category, message);
                return Diagnostic::failure(message, err.category, err.position);
            }
        };

        let nodes = ast.node_count();
        if nodes > self.config.max_nodes {
            let message = format!(
                "Formula too complex: {} nodes exceeds the limit of {}",
                nodes, self.config.max_nodes
            );
            log::debug!("formula rejected (syntax): {}", message);
            return Diagnostic::failure(message, ErrorCategory::Syntax, None);
        }

        Diagnostic::success(ast)
    }

    /// Validates, then evaluates against `context`.
    pub fn evaluate_formula(&self, formula: &str, context: &Context) -> Result<Value, FormulaError> {
        let ast = self.validated_ast(formula)?;
        Evaluator::new(&self.registry, context)
            .evaluate(&ast)
            .map_err(|err| {
                log::debug!("evaluation of '{}' failed: {}", formula, err);
                FormulaError::Evaluation(err)
            })
    }

    fn validated_ast(&self, formula: &str) -> Result<Expression, FormulaError> {
        let diagnostic = self.validate_expression(formula);
        match (diagnostic.ast, diagnostic.error) {
            (Some(ast), _) => Ok(ast),
            (None, Some(error)) => Err(FormulaError::Invalid {
                message: error.message,
                category: error.category,
            }),
            (None, None) => Err(FormulaError::Invalid {
                message: "Empty expression".to_string(),
                category: ErrorCategory::EmptyExpression,
            }),
        }
    }

    // ========================================================================
    // FUNCTION CATALOG
    // ========================================================================

    /// Every registered function, in catalog order.
    pub fn function_suggestions(&self) -> &[FunctionDescriptor] {
        self.registry.list_all()
    }

    /// Case-insensitive lookup.
    pub fn function_info(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.registry.lookup(name)
    }

    pub fn functions_by_category(&self, category: &str) -> Vec<&FunctionDescriptor> {
        self.registry.by_category(category)
    }

    pub fn categories(&self) -> Vec<&Category> {
        self.registry.categories()
    }

    // ========================================================================
    // DEBUGGING AIDS
    // ========================================================================

    /// Reports the operator at the root of the formula with its precedence
    /// level and associativity.
    pub fn check_precedence(&self, formula: &str) -> OperatorInfo {
        match self.validated_ast(formula) {
            Ok(Expression::BinaryOp { op, .. }) => OperatorInfo::for_operator(op),
            Ok(_) => OperatorInfo::no_operator(),
            Err(err) => OperatorInfo::invalid(err.to_string()),
        }
    }

    /// Evaluates while recording each operator and call result in post-order.
    /// On failure the steps recorded before the error are kept.
    pub fn evaluation_steps(&self, formula: &str, context: &Context) -> EvaluationTrace {
        let ast = match self.validated_ast(formula) {
            Ok(ast) => ast,
            Err(err) => {
                return EvaluationTrace {
                    steps: Vec::new(),
                    result: None,
                    valid: false,
                    error: Some(err.to_string()),
                }
            }
        };

        let evaluator = Evaluator::with_trace(&self.registry, context);
        let outcome = evaluator.evaluate(&ast);
        let mut steps = evaluator.take_steps();

        match outcome {
            Ok(result) => {
                if steps.is_empty() {
                    steps.push(EvaluationStep {
                        step: 1,
                        description: "Final result".to_string(),
                        expression: ast.to_string(),
                        result: result.clone(),
                    });
                }
                EvaluationTrace {
                    steps,
                    result: Some(result),
                    valid: true,
                    error: None,
                }
            }
            Err(err) => EvaluationTrace {
                steps,
                result: None,
                valid: false,
                error: Some(FormulaError::Evaluation(err).to_string()),
            },
        }
    }
}

// ============================================================================
// ERROR MESSAGE FORMATTING
// ============================================================================

static REWRITES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bparse error\b", "syntax error"),
        (r"(?i)\bunexpected token\b", "unexpected character"),
        (r"(?i)\bexpected\b", "missing"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid rewrite pattern"), replacement))
    .collect()
});

/// Rewrites parser terminology into user-facing wording. A capitalized match
/// keeps its capital.
pub fn format_error(message: &str) -> String {
    REWRITES
        .iter()
        .fold(message.to_string(), |text, (pattern, replacement)| {
            pattern
                .replace_all(&text, |caps: &Captures| match_case(&caps[0], replacement))
                .into_owned()
        })
}

fn match_case(found: &str, replacement: &str) -> String {
    let capitalized = found.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if capitalized => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}
