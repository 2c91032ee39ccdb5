//! FILENAME: tests/test_custom_functions.rs
//! Integration tests for caller-supplied functions, overrides and the catalog.

mod common;

use common::TestHarness;
use formula_engine::{
    Arity, Category, EvaluationError, FormulaEngine, FunctionDescriptor, ReturnType, Value,
};
use std::sync::Arc;
use std::thread;

fn constant_sum() -> FunctionDescriptor {
    FunctionDescriptor::new("SUM", Arity::Variadic(0), |_args: &[Value]| {
        Ok(Value::Number(42.0))
    })
    .with_category("math")
    .with_description("Always 42")
}

fn discount() -> FunctionDescriptor {
    FunctionDescriptor::new("discount", Arity::Range { min: 1, max: 2 }, |args: &[Value]| {
        let price = args[0]
            .as_number()
            .ok_or_else(|| EvaluationError::type_mismatch("DISCOUNT", "number", args[0].type_name()))?;
        let rate = args.get(1).and_then(Value::as_number).unwrap_or(0.1);
        Ok(Value::Number(price * (1.0 - rate)))
    })
    .with_category("Pricing")
    .with_signature("DISCOUNT(price, rate)")
    .with_return_type(ReturnType::Number)
}

// ============================================================================
// OVERRIDES
// ============================================================================

#[test]
fn test_custom_sum_overrides_builtin() {
    let engine = FormulaEngine::with_functions(vec![constant_sum()]);
    let harness = TestHarness::with_engine(engine);

    assert_eq!(harness.number("SUM(1, 2, 3)"), 42.0);
    assert_eq!(harness.engine.function_info("sum").unwrap().description, "Always 42");
}

#[test]
fn test_override_keeps_catalog_size_and_slot() {
    let builtin = FormulaEngine::new();
    let custom = FormulaEngine::with_functions(vec![constant_sum()]);

    assert_eq!(custom.function_suggestions().len(), builtin.function_suggestions().len());

    let slot = |engine: &FormulaEngine| {
        engine
            .function_suggestions()
            .iter()
            .position(|f| f.name == "SUM")
    };
    assert_eq!(slot(&custom), slot(&builtin));
}

#[test]
fn test_last_registration_wins() {
    let first = FunctionDescriptor::new("twice", Arity::Fixed(1), |_args: &[Value]| {
        Ok(Value::Number(1.0))
    });
    let second = FunctionDescriptor::new("TWICE", Arity::Fixed(1), |args: &[Value]| {
        Ok(Value::Number(args[0].as_number().unwrap_or(0.0) * 2.0))
    });

    let engine = FormulaEngine::with_functions(vec![first, second]);
    let harness = TestHarness::with_engine(engine);
    assert_eq!(harness.number("twice(21)"), 42.0);
}

// ============================================================================
// CUSTOM FUNCTIONS
// ============================================================================

#[test]
fn test_custom_function_with_optional_argument() {
    let harness = TestHarness::with_engine(FormulaEngine::with_functions(vec![discount()]));

    assert_eq!(harness.number("DISCOUNT(200)"), 180.0);
    assert_eq!(harness.number("Discount(revenue, 0.5)"), 500.0);
    assert!(matches!(
        harness.error("DISCOUNT()"),
        formula_engine::FormulaError::Evaluation(EvaluationError::ArityMismatch { .. })
    ));
    assert!(matches!(
        harness.error(r#"DISCOUNT("free")"#),
        formula_engine::FormulaError::Evaluation(EvaluationError::TypeMismatch { .. })
    ));
}

#[test]
fn test_custom_category_is_listed_last() {
    let engine = FormulaEngine::with_functions(vec![discount()]);

    let categories: Vec<String> = engine.categories().iter().map(|c| c.to_string()).collect();
    assert_eq!(
        categories,
        vec!["string", "math", "statistical", "logical", "date", "financial", "utility", "pricing"]
    );

    let pricing = engine.functions_by_category("PRICING");
    assert_eq!(pricing.len(), 1);
    assert_eq!(pricing[0].name, "DISCOUNT");
    assert_eq!(pricing[0].signature, "DISCOUNT(price, rate)");
}

// ============================================================================
// CATALOG
// ============================================================================

#[test]
fn test_builtin_catalog() {
    let engine = FormulaEngine::new();

    assert_eq!(engine.function_suggestions().len(), 76);
    assert_eq!(engine.functions_by_category("math").len(), 23);
    assert_eq!(engine.functions_by_category("Financial").len(), 6);
    assert!(engine.functions_by_category("nonexistent").is_empty());

    for descriptor in engine.function_suggestions() {
        assert_eq!(descriptor.name, descriptor.name.to_uppercase());
        assert!(!descriptor.description.is_empty(), "{} lacks a description", descriptor.name);
        assert!(descriptor.signature.starts_with(&descriptor.name));
    }
}

#[test]
fn test_function_info_is_case_insensitive() {
    let engine = FormulaEngine::new();

    assert_eq!(engine.function_info("sum"), engine.function_info("SUM"));
    let sum = engine.function_info("Sum").unwrap();
    assert_eq!(sum.category, Category::Math);
    assert_eq!(sum.return_type, ReturnType::Number);
    assert!(engine.function_info("NOPE").is_none());
}

// ============================================================================
// THREADING
// ============================================================================

#[test]
fn test_engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FormulaEngine>();
    assert_send_sync::<FunctionDescriptor>();
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(FormulaEngine::with_functions(vec![discount()]));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let ctx = formula_engine::Context::new().with("price", (i * 100) as f64);
                engine.evaluate_formula("DISCOUNT(price, 0.25) + SUM(1, 2)", &ctx)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert_eq!(result, Ok(Value::Number(i as f64 * 75.0 + 3.0)));
    }
}
