//! Logical and type-inspection functions. All conditions use value truthiness.

use super::{arg, def, loosely_equal, Builtin};
use crate::registry::{Arity, FunctionResult, ReturnType};
use crate::value::Value;

pub const FUNCTIONS: &[Builtin] = &[
    def("IF", Arity::Fixed(3), 3, ReturnType::Any,
        "IF(condition, value_if_true, value_if_false)",
        "Returns one value if condition is true, another if false",
        r#"IF(5 > 3, "Yes", "No")"#, if_fn),
    def("IFS", Arity::Variadic(2), 4, ReturnType::Any,
        "IFS(condition1, value1, condition2, value2, ...)",
        "Checks multiple conditions and returns corresponding values",
        r#"IFS(score > 90, "A", score > 80, "B", score > 70, "C")"#, ifs),
    def("AND", Arity::Variadic(1), 2, ReturnType::Boolean,
        "AND(logical1, logical2, ...)", "Returns true if all conditions are true",
        "AND(5 > 3, 10 < 20)", and),
    def("OR", Arity::Variadic(1), 2, ReturnType::Boolean,
        "OR(logical1, logical2, ...)", "Returns true if any condition is true",
        "OR(5 > 10, 3 < 5)", or),
    def("NOT", Arity::Fixed(1), 1, ReturnType::Boolean,
        "NOT(logical)", "Returns the opposite of a logical value",
        "NOT(5 > 10)", not),
    def("XOR", Arity::Variadic(1), 2, ReturnType::Boolean,
        "XOR(logical1, logical2, ...)", "Returns true if an odd number of conditions are true",
        "XOR(true, false, true)", xor),
    def("ISNUMBER", Arity::Fixed(1), 1, ReturnType::Boolean,
        "ISNUMBER(value)", "Returns true if value is a number",
        "ISNUMBER(123)", is_number),
    def("ISTEXT", Arity::Fixed(1), 1, ReturnType::Boolean,
        "ISTEXT(value)", "Returns true if value is text",
        r#"ISTEXT("Hello")"#, is_text),
    def("ISBLANK", Arity::Fixed(1), 1, ReturnType::Boolean,
        "ISBLANK(value)", "Returns true if value is blank",
        r#"ISBLANK("")"#, is_blank),
    def("ISERROR", Arity::Fixed(1), 1, ReturnType::Boolean,
        "ISERROR(value)", "Returns true if value is an error",
        "ISERROR(1/0)", is_error),
    def("SWITCH", Arity::Variadic(3), 3, ReturnType::Any,
        "SWITCH(expression, value1, result1, value2, result2, ...)",
        "Evaluates expression against a list of values",
        r#"SWITCH(2, 1, "One", 2, "Two", 3, "Three")"#, switch),
];

fn if_fn(args: &[Value]) -> FunctionResult {
    let chosen = if arg(args, 0).is_truthy() {
        arg(args, 1)
    } else {
        arg(args, 2)
    };
    Ok(chosen.clone())
}

/// Condition/value pairs; an unpaired trailing argument is the fallback.
fn ifs(args: &[Value]) -> FunctionResult {
    for pair in args.chunks_exact(2) {
        if pair[0].is_truthy() {
            return Ok(pair[1].clone());
        }
    }
    Ok(fallback(args))
}

fn fallback(pairs: &[Value]) -> Value {
    if pairs.len() % 2 == 1 {
        pairs[pairs.len() - 1].clone()
    } else {
        Value::Null
    }
}

fn conditions(args: &[Value]) -> impl Iterator<Item = bool> + '_ {
    args.iter()
        .flat_map(Value::flatten)
        .map(|value| value.is_truthy())
}

fn and(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(conditions(args).all(|c| c)))
}

fn or(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(conditions(args).any(|c| c)))
}

fn not(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(!arg(args, 0).is_truthy()))
}

fn xor(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(conditions(args).filter(|c| *c).count() % 2 == 1))
}

fn is_number(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::Number(n) if !n.is_nan())))
}

fn is_text(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(matches!(arg(args, 0), Value::String(_))))
}

fn is_blank(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(match arg(args, 0) {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }))
}

/// Error-like values: non-finite numbers and text starting with "Error:".
fn is_error(args: &[Value]) -> FunctionResult {
    Ok(Value::Boolean(match arg(args, 0) {
        Value::Number(n) => !n.is_finite(),
        Value::String(s) => s.starts_with("Error:"),
        _ => false,
    }))
}

fn switch(args: &[Value]) -> FunctionResult {
    let (subject, cases) = (arg(args, 0), args.get(1..).unwrap_or_default());
    for pair in cases.chunks_exact(2) {
        if loosely_equal(subject, &pair[0]) {
            return Ok(pair[1].clone());
        }
    }
    Ok(fallback(cases))
}
