//! FILENAME: core/engine/src/builtins/mod.rs
//! PURPOSE: The built-in function catalog, organized by category.
//! CONTEXT: Each category module exposes a `FUNCTIONS` table. Rows carry the
//! metadata shown in tooling alongside a plain function pointer; they are
//! turned into registry descriptors once, when the registry is built.

pub mod date;
pub mod financial;
pub mod logical;
pub mod math;
pub mod statistical;
pub mod string;
pub mod utility;

use crate::error::{EvalResult, EvaluationError};
use crate::registry::{Arity, Category, FunctionDescriptor, FunctionRegistry, FunctionResult, ReturnType};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Signature shared by every built-in.
pub type BuiltinFunction = fn(&[Value]) -> FunctionResult;

/// One row of a category table.
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub parameter_count: usize,
    pub return_type: ReturnType,
    pub signature: &'static str,
    pub description: &'static str,
    pub example: &'static str,
    pub function: BuiltinFunction,
}

#[allow(clippy::too_many_arguments)]
pub(crate) const fn def(
    name: &'static str,
    arity: Arity,
    parameter_count: usize,
    return_type: ReturnType,
    signature: &'static str,
    description: &'static str,
    example: &'static str,
    function: BuiltinFunction,
) -> Builtin {
    Builtin {
        name,
        arity,
        parameter_count,
        return_type,
        signature,
        description,
        example,
        function,
    }
}

impl Builtin {
    fn descriptor(&self, category: Category) -> FunctionDescriptor {
        FunctionDescriptor::new(self.name, self.arity, self.function)
            .with_category(category)
            .with_signature(self.signature)
            .with_description(self.description)
            .with_example(self.example)
            .with_return_type(self.return_type)
            .with_parameter_count(self.parameter_count)
    }
}

/// Registers the whole catalog in palette order.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    let tables: [(Category, &[Builtin]); 7] = [
        (Category::String, string::FUNCTIONS),
        (Category::Math, math::FUNCTIONS),
        (Category::Statistical, statistical::FUNCTIONS),
        (Category::Logical, logical::FUNCTIONS),
        (Category::Date, date::FUNCTIONS),
        (Category::Financial, financial::FUNCTIONS),
        (Category::Utility, utility::FUNCTIONS),
    ];

    for (category, table) in tables {
        registry.register_all(table.iter().map(|row| row.descriptor(category.clone())));
    }
}

// ============================================================================
// ARGUMENT HELPERS
// ============================================================================

/// Numeric argument at `index`. The evaluator has already checked arity, so
/// a missing index only happens when an optional parameter is read without
/// a default.
pub(crate) fn number_arg(function: &str, args: &[Value], index: usize) -> EvalResult<f64> {
    let value = args.get(index).ok_or_else(|| {
        EvaluationError::invalid_argument(function, format!("missing argument {}", index + 1))
    })?;
    value
        .as_number()
        .ok_or_else(|| EvaluationError::type_mismatch(function, "number", value.type_name()))
}

/// Optional numeric argument; absent or null yields `default`.
pub(crate) fn opt_number_arg(
    function: &str,
    args: &[Value],
    index: usize,
    default: f64,
) -> EvalResult<f64> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(default),
        Some(_) => number_arg(function, args, index),
    }
}

static NULL: Value = Value::Null;

/// Argument at `index`, or null when absent.
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

/// Text form of the argument at `index`; absent arguments are empty text.
pub(crate) fn text_arg(args: &[Value], index: usize) -> String {
    args.get(index).map(Value::as_text).unwrap_or_default()
}

/// Integer view of a numeric argument, truncated toward zero.
pub(crate) fn int_arg(function: &str, args: &[Value], index: usize) -> EvalResult<i64> {
    let n = number_arg(function, args, index)?;
    if !n.is_finite() {
        return Err(EvaluationError::invalid_argument(
            function,
            format!("argument {} must be finite", index + 1),
        ));
    }
    Ok(n.trunc() as i64)
}

/// Date argument: a DateTime value, or text in one of the accepted layouts.
pub(crate) fn date_arg(function: &str, args: &[Value], index: usize) -> EvalResult<NaiveDateTime> {
    match args.get(index) {
        Some(Value::DateTime(dt)) => Ok(*dt),
        Some(Value::String(s)) => parse_date(s).ok_or_else(|| {
            EvaluationError::invalid_argument(function, format!("cannot read '{}' as a date", s))
        }),
        Some(other) => Err(EvaluationError::type_mismatch(function, "date", other.type_name())),
        None => Err(EvaluationError::invalid_argument(
            function,
            format!("missing argument {}", index + 1),
        )),
    }
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Elements of a list argument; a scalar acts as a one-element list.
pub(crate) fn list_arg(args: &[Value], index: usize) -> Vec<Value> {
    match args.get(index) {
        Some(Value::List(items)) => items.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    }
}

/// Every argument flattened and coerced to a number. Nulls are skipped.
pub(crate) fn numbers(function: &str, args: &[Value]) -> EvalResult<Vec<f64>> {
    let mut out = Vec::new();
    for value in args.iter().flat_map(Value::flatten) {
        if value.is_null() {
            continue;
        }
        let n = value
            .as_number()
            .ok_or_else(|| EvaluationError::type_mismatch(function, "number", value.type_name()))?;
        out.push(n);
    }
    Ok(out)
}

/// Loose equality used by SWITCH, MATCH and the lookups: numbers compare by
/// value across coercible kinds, everything else structurally.
pub(crate) fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_) | Value::Boolean(_), Value::Number(_) | Value::Boolean(_)) => {
            a.as_number() == b.as_number()
        }
        _ => a == b,
    }
}
