//! Statistical functions over flattened numeric arguments.

use super::{def, list_arg, number_arg, numbers, Builtin};
use crate::error::{EvalResult, EvaluationError};
use crate::registry::{Arity, FunctionResult, ReturnType};
use crate::value::Value;

pub const FUNCTIONS: &[Builtin] = &[
    def("MEDIAN", Arity::Variadic(1), 2, ReturnType::Number,
        "MEDIAN(number1, number2, ...)", "Returns the median of a set of numbers",
        "MEDIAN(1, 2, 3, 4, 5)", median),
    def("MODE", Arity::Variadic(1), 2, ReturnType::Number,
        "MODE(number1, number2, ...)", "Returns the most frequently occurring value",
        "MODE(1, 2, 2, 3, 4)", mode),
    def("STDEV", Arity::Variadic(1), 2, ReturnType::Number,
        "STDEV(number1, number2, ...)", "Returns the standard deviation of a sample",
        "STDEV(1, 2, 3, 4, 5)", stdev),
    def("VAR", Arity::Variadic(1), 2, ReturnType::Number,
        "VAR(number1, number2, ...)", "Returns the variance of a sample",
        "VAR(1, 2, 3, 4, 5)", var),
    def("PERCENTILE", Arity::Fixed(2), 2, ReturnType::Number,
        "PERCENTILE(array, k)", "Returns the k-th percentile of values",
        "PERCENTILE([1,2,3,4,5], 50)", percentile),
    def("QUARTILE", Arity::Fixed(2), 2, ReturnType::Number,
        "QUARTILE(array, quart)", "Returns the quartile of a data set",
        "QUARTILE([1,2,3,4,5], 2)", quartile),
];

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

fn non_empty(function: &str, values: Vec<f64>) -> EvalResult<Vec<f64>> {
    if values.is_empty() {
        return Err(EvaluationError::invalid_argument(function, "no numeric values"));
    }
    Ok(values)
}

fn median(args: &[Value]) -> FunctionResult {
    let values = sorted(non_empty("MEDIAN", numbers("MEDIAN", args)?)?);
    let mid = values.len() / 2;
    let result = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    Ok(Value::Number(result))
}

/// Most frequent value; ties go to the value that reached the top count
/// first. Null when nothing repeats.
fn mode(args: &[Value]) -> FunctionResult {
    let values = numbers("MODE", args)?;
    let mut counts: Vec<(f64, usize)> = Vec::new();
    let mut best: Option<(f64, usize)> = None;

    for value in values {
        let slot = match counts.iter().position(|(v, _)| *v == value) {
            Some(i) => i,
            None => {
                counts.push((value, 0));
                counts.len() - 1
            }
        };
        counts[slot].1 += 1;
        let frequency = counts[slot].1;
        if best.map_or(true, |(_, top)| frequency > top) {
            best = Some((value, frequency));
        }
    }

    Ok(match best {
        Some((value, frequency)) if frequency > 1 => Value::Number(value),
        _ => Value::Null,
    })
}

fn sample_variance(function: &str, args: &[Value]) -> EvalResult<f64> {
    let values = numbers(function, args)?;
    if values.len() < 2 {
        return Err(EvaluationError::invalid_argument(
            function,
            "at least two values are required",
        ));
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Ok(squares / (values.len() - 1) as f64)
}

fn stdev(args: &[Value]) -> FunctionResult {
    Ok(Value::Number(sample_variance("STDEV", args)?.sqrt()))
}

fn var(args: &[Value]) -> FunctionResult {
    Ok(Value::Number(sample_variance("VAR", args)?))
}

/// Linear interpolation between closest ranks, k in 0..=100.
fn percentile_of(function: &str, values: Vec<f64>, k: f64) -> FunctionResult {
    if !(0.0..=100.0).contains(&k) {
        return Err(EvaluationError::invalid_argument(
            function,
            "percentile must be between 0 and 100",
        ));
    }
    let values = sorted(non_empty(function, values)?);
    let index = (k / 100.0) * (values.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    let weight = index.fract();
    Ok(Value::Number(
        values[lower] * (1.0 - weight) + values[upper] * weight,
    ))
}

fn percentile(args: &[Value]) -> FunctionResult {
    let values = numbers("PERCENTILE", &list_arg(args, 0))?;
    let k = number_arg("PERCENTILE", args, 1)?;
    percentile_of("PERCENTILE", values, k)
}

fn quartile(args: &[Value]) -> FunctionResult {
    let values = numbers("QUARTILE", &list_arg(args, 0))?;
    let quart = number_arg("QUARTILE", args, 1)?.trunc();
    if !(0.0..=4.0).contains(&quart) {
        return Err(EvaluationError::invalid_argument(
            "QUARTILE",
            "quart must be between 0 and 4",
        ));
    }
    percentile_of("QUARTILE", values, quart * 25.0)
}
