//! Math functions, including the aggregates that flatten list arguments.

use super::{def, number_arg, numbers, opt_number_arg, Builtin};
use crate::error::EvaluationError;
use crate::registry::{Arity, FunctionResult, ReturnType};
use crate::value::Value;
use rand::Rng;

const OPTIONAL_DIGITS: Arity = Arity::Range { min: 1, max: 2 };

pub const FUNCTIONS: &[Builtin] = &[
    def("ROUND", OPTIONAL_DIGITS, 2, ReturnType::Number,
        "ROUND(number, decimals)", "Rounds a number to specified decimal places",
        "ROUND(3.14159, 2)", round),
    def("ROUNDUP", OPTIONAL_DIGITS, 2, ReturnType::Number,
        "ROUNDUP(number, decimals)", "Rounds a number up to specified decimal places",
        "ROUNDUP(3.14159, 2)", round_up),
    def("ROUNDDOWN", OPTIONAL_DIGITS, 2, ReturnType::Number,
        "ROUNDDOWN(number, decimals)", "Rounds a number down to specified decimal places",
        "ROUNDDOWN(3.14159, 2)", round_down),
    def("ABS", Arity::Fixed(1), 1, ReturnType::Number,
        "ABS(number)", "Returns the absolute value of a number",
        "ABS(-5)", abs),
    def("MAX", Arity::Variadic(1), 2, ReturnType::Number,
        "MAX(number1, number2, ...)", "Returns the maximum value from a list of numbers",
        "MAX(10, 20, 5)", max),
    def("MIN", Arity::Variadic(1), 2, ReturnType::Number,
        "MIN(number1, number2, ...)", "Returns the minimum value from a list of numbers",
        "MIN(10, 20, 5)", min),
    def("SUM", Arity::Variadic(0), 2, ReturnType::Number,
        "SUM(number1, number2, ...)", "Returns the sum of all numbers",
        "SUM(1, 2, 3, 4)", sum),
    def("AVERAGE", Arity::Variadic(0), 2, ReturnType::Number,
        "AVERAGE(number1, number2, ...)", "Returns the average of all numbers",
        "AVERAGE(10, 20, 30)", average),
    def("COUNT", Arity::Variadic(0), 2, ReturnType::Number,
        "COUNT(value1, value2, ...)", "Counts the number of values",
        r#"COUNT(1, 2, 3, "text")"#, count),
    def("COUNTA", Arity::Variadic(0), 2, ReturnType::Number,
        "COUNTA(value1, value2, ...)", "Counts non-empty values",
        r#"COUNTA(1, 2, "", "text")"#, count_a),
    def("COUNTBLANK", Arity::Variadic(0), 2, ReturnType::Number,
        "COUNTBLANK(value1, value2, ...)", "Counts empty values",
        r#"COUNTBLANK(1, "", null)"#, count_blank),
    def("MOD", Arity::Fixed(2), 2, ReturnType::Number,
        "MOD(number, divisor)", "Returns the remainder after division",
        "MOD(10, 3)", modulo),
    def("POWER", Arity::Fixed(2), 2, ReturnType::Number,
        "POWER(number, power)", "Returns the result of a number raised to a power",
        "POWER(2, 3)", power),
    def("SQRT", Arity::Fixed(1), 1, ReturnType::Number,
        "SQRT(number)", "Returns the square root of a number",
        "SQRT(16)", sqrt),
    def("EXP", Arity::Fixed(1), 1, ReturnType::Number,
        "EXP(number)", "Returns e raised to the power of a number",
        "EXP(1)", exp),
    def("LN", Arity::Fixed(1), 1, ReturnType::Number,
        "LN(number)", "Returns the natural logarithm of a number",
        "LN(10)", ln),
    def("LOG", Arity::Range { min: 1, max: 2 }, 2, ReturnType::Number,
        "LOG(number, base)", "Returns the logarithm of a number to a specified base",
        "LOG(100, 10)", log),
    def("LOG10", Arity::Fixed(1), 1, ReturnType::Number,
        "LOG10(number)", "Returns the base-10 logarithm of a number",
        "LOG10(100)", log10),
    def("SIGN", Arity::Fixed(1), 1, ReturnType::Number,
        "SIGN(number)", "Returns the sign of a number",
        "SIGN(-5)", sign),
    def("INT", Arity::Fixed(1), 1, ReturnType::Number,
        "INT(number)", "Rounds a number down to the nearest integer",
        "INT(3.7)", int),
    def("TRUNC", OPTIONAL_DIGITS, 2, ReturnType::Number,
        "TRUNC(number, digits)", "Truncates a number to specified decimal places",
        "TRUNC(3.14159, 2)", trunc),
    def("RAND", Arity::Fixed(0), 0, ReturnType::Number,
        "RAND()", "Returns a random number between 0 and 1",
        "RAND()", rand_unit),
    def("RANDBETWEEN", Arity::Fixed(2), 2, ReturnType::Number,
        "RANDBETWEEN(bottom, top)", "Returns a random integer between two numbers",
        "RANDBETWEEN(1, 10)", rand_between),
];

fn unary(function: &str, args: &[Value], op: fn(f64) -> f64) -> FunctionResult {
    Ok(Value::Number(op(number_arg(function, args, 0)?)))
}

/// Scales by 10^digits, applies `op`, and scales back.
fn scaled(function: &str, args: &[Value], op: fn(f64) -> f64) -> FunctionResult {
    let number = number_arg(function, args, 0)?;
    let digits = opt_number_arg(function, args, 1, 0.0)?;
    let factor = 10f64.powf(digits);
    Ok(Value::Number(op(number * factor) / factor))
}

fn round(args: &[Value]) -> FunctionResult {
    scaled("ROUND", args, f64::round)
}

fn round_up(args: &[Value]) -> FunctionResult {
    scaled("ROUNDUP", args, f64::ceil)
}

fn round_down(args: &[Value]) -> FunctionResult {
    scaled("ROUNDDOWN", args, f64::floor)
}

fn trunc(args: &[Value]) -> FunctionResult {
    scaled("TRUNC", args, f64::trunc)
}

fn abs(args: &[Value]) -> FunctionResult {
    unary("ABS", args, f64::abs)
}

fn max(args: &[Value]) -> FunctionResult {
    let values = numbers("MAX", args)?;
    Ok(Value::Number(
        values.into_iter().fold(f64::NEG_INFINITY, f64::max),
    ))
}

fn min(args: &[Value]) -> FunctionResult {
    let values = numbers("MIN", args)?;
    Ok(Value::Number(values.into_iter().fold(f64::INFINITY, f64::min)))
}

fn sum(args: &[Value]) -> FunctionResult {
    Ok(Value::Number(numbers("SUM", args)?.iter().sum()))
}

fn average(args: &[Value]) -> FunctionResult {
    let values = numbers("AVERAGE", args)?;
    if values.is_empty() {
        return Ok(Value::Number(0.0));
    }
    Ok(Value::Number(values.iter().sum::<f64>() / values.len() as f64))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn count(args: &[Value]) -> FunctionResult {
    let total = args.iter().map(|arg| arg.flatten().len()).sum::<usize>();
    Ok(Value::Number(total as f64))
}

fn count_a(args: &[Value]) -> FunctionResult {
    let total = args
        .iter()
        .flat_map(Value::flatten)
        .filter(|v| !is_blank(v))
        .count();
    Ok(Value::Number(total as f64))
}

fn count_blank(args: &[Value]) -> FunctionResult {
    let total = args
        .iter()
        .flat_map(Value::flatten)
        .filter(is_blank)
        .count();
    Ok(Value::Number(total as f64))
}

fn modulo(args: &[Value]) -> FunctionResult {
    let number = number_arg("MOD", args, 0)?;
    let divisor = number_arg("MOD", args, 1)?;
    Ok(Value::Number(number % divisor))
}

fn power(args: &[Value]) -> FunctionResult {
    let base = number_arg("POWER", args, 0)?;
    let exponent = number_arg("POWER", args, 1)?;
    Ok(Value::Number(base.powf(exponent)))
}

fn sqrt(args: &[Value]) -> FunctionResult {
    unary("SQRT", args, f64::sqrt)
}

fn exp(args: &[Value]) -> FunctionResult {
    unary("EXP", args, f64::exp)
}

fn ln(args: &[Value]) -> FunctionResult {
    unary("LN", args, f64::ln)
}

fn log(args: &[Value]) -> FunctionResult {
    let number = number_arg("LOG", args, 0)?;
    let base = opt_number_arg("LOG", args, 1, 10.0)?;
    Ok(Value::Number(number.ln() / base.ln()))
}

fn log10(args: &[Value]) -> FunctionResult {
    unary("LOG10", args, f64::log10)
}

fn sign(args: &[Value]) -> FunctionResult {
    unary("SIGN", args, |n| {
        if n > 0.0 {
            1.0
        } else if n < 0.0 {
            -1.0
        } else {
            n
        }
    })
}

fn int(args: &[Value]) -> FunctionResult {
    unary("INT", args, f64::floor)
}

fn rand_unit(_args: &[Value]) -> FunctionResult {
    Ok(Value::Number(rand::thread_rng().gen::<f64>()))
}

fn rand_between(args: &[Value]) -> FunctionResult {
    let bottom = number_arg("RANDBETWEEN", args, 0)?.ceil();
    let top = number_arg("RANDBETWEEN", args, 1)?.floor();
    if !bottom.is_finite() || !top.is_finite() || bottom > top {
        return Err(EvaluationError::invalid_argument(
            "RANDBETWEEN",
            "bottom must not exceed top",
        ));
    }
    let (bottom, top) = (bottom as i64, top as i64);
    Ok(Value::Number(
        rand::thread_rng().gen_range(bottom..=top) as f64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    fn approx(value: Value, expected: f64) {
        match value {
            Value::Number(actual) => assert!(
                (actual - expected).abs() < 1e-9,
                "expected {}, got {}",
                expected,
                actual
            ),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_rounding_family() {
        approx(round(&[n(3.14159), n(2.0)]).unwrap(), 3.14);
        approx(round(&[n(2.5)]).unwrap(), 3.0);
        approx(round_up(&[n(3.14159), n(2.0)]).unwrap(), 3.15);
        approx(round_down(&[n(3.14159), n(2.0)]).unwrap(), 3.14);
        approx(trunc(&[n(-3.79), n(1.0)]).unwrap(), -3.7);
        approx(round(&[n(1234.0), n(-2.0)]).unwrap(), 1200.0);
    }

    #[test]
    fn test_aggregates_flatten_lists() {
        let list = Value::from(vec![1.0, 2.0, 3.0]);
        assert_eq!(sum(&[list.clone(), n(4.0)]).unwrap(), n(10.0));
        assert_eq!(max(&[list.clone()]).unwrap(), n(3.0));
        assert_eq!(min(&[list, n(-1.0)]).unwrap(), n(-1.0));
        assert_eq!(average(&[n(10.0), n(20.0), n(30.0)]).unwrap(), n(20.0));
        assert_eq!(average(&[]).unwrap(), n(0.0));
        assert_eq!(sum(&[]).unwrap(), n(0.0));
    }

    #[test]
    fn test_counting() {
        let args = [n(1.0), n(2.0), Value::from(""), Value::from("text"), Value::Null];
        assert_eq!(count(&args).unwrap(), n(5.0));
        assert_eq!(count_a(&args).unwrap(), n(3.0));
        assert_eq!(count_blank(&args).unwrap(), n(2.0));
    }

    #[test]
    fn test_sign_and_int() {
        assert_eq!(sign(&[n(-5.0)]).unwrap(), n(-1.0));
        assert_eq!(sign(&[n(0.0)]).unwrap(), n(0.0));
        assert_eq!(int(&[n(-3.2)]).unwrap(), n(-4.0));
    }

    #[test]
    fn test_logarithms() {
        approx(log(&[n(100.0)]).unwrap(), 2.0);
        approx(log(&[n(8.0), n(2.0)]).unwrap(), 3.0);
        approx(log10(&[n(1000.0)]).unwrap(), 3.0);
        approx(ln(&[n(std::f64::consts::E)]).unwrap(), 1.0);
    }

    #[test]
    fn test_mod_keeps_ieee_semantics() {
        assert_eq!(modulo(&[n(10.0), n(3.0)]).unwrap(), n(1.0));
        match modulo(&[n(1.0), n(0.0)]).unwrap() {
            Value::Number(x) => assert!(x.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_random_functions_stay_in_range() {
        for _ in 0..100 {
            match rand_unit(&[]).unwrap() {
                Value::Number(x) => assert!((0.0..1.0).contains(&x)),
                other => panic!("unexpected {:?}", other),
            }
            match rand_between(&[n(1.0), n(6.0)]).unwrap() {
                Value::Number(x) => assert!((1.0..=6.0).contains(&x) && x.fract() == 0.0),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(rand_between(&[n(5.0), n(1.0)]).is_err());
    }
}
