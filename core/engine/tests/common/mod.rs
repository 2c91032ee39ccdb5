//! FILENAME: tests/common/mod.rs
//! Shared fixtures for formula engine integration tests.

#![allow(dead_code)]

use formula_engine::{Context, FormulaEngine, FormulaError, Value};

/// Test harness wrapping an engine and the context formulas run against.
pub struct TestHarness {
    pub engine: FormulaEngine,
    pub context: Context,
}

impl TestHarness {
    /// Built-in functions, empty context.
    pub fn new() -> Self {
        TestHarness {
            engine: FormulaEngine::new(),
            context: Context::new(),
        }
    }

    /// Built-in functions with a small business dataset.
    pub fn with_sample_data() -> Self {
        TestHarness {
            engine: FormulaEngine::new(),
            context: sample_context(),
        }
    }

    pub fn with_engine(engine: FormulaEngine) -> Self {
        TestHarness {
            engine,
            context: sample_context(),
        }
    }

    pub fn eval(&self, formula: &str) -> Result<Value, FormulaError> {
        self.engine.evaluate_formula(formula, &self.context)
    }

    /// Evaluates a formula that must succeed.
    pub fn value(&self, formula: &str) -> Value {
        match self.eval(formula) {
            Ok(value) => value,
            Err(err) => panic!("'{}' failed: {}", formula, err),
        }
    }

    /// Evaluates a formula that must produce a number.
    pub fn number(&self, formula: &str) -> f64 {
        match self.value(formula) {
            Value::Number(n) => n,
            other => panic!("'{}' produced {} instead of a number", formula, other),
        }
    }

    /// Evaluates a formula that must fail, returning the error.
    pub fn error(&self, formula: &str) -> FormulaError {
        match self.eval(formula) {
            Ok(value) => panic!("'{}' unexpectedly produced {}", formula, value),
            Err(err) => err,
        }
    }
}

pub fn sample_context() -> Context {
    Context::new()
        .with("revenue", 1000.0)
        .with("costs", 300.0)
        .with("tax_rate", 0.25)
        .with("region", "North")
        .with("active", true)
        .with("sales", Value::from(vec![120.0, 80.0, 200.0, 150.0, 50.0]))
        .with("missing_value", Value::Null)
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} within {}, got {}",
        expected,
        tolerance,
        actual
    );
}
