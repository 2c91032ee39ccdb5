//! Time-value-of-money functions. Cash paid out is negative, received is
//! positive. `type` selects end-of-period (0) or start-of-period (1) payments.

use super::{def, list_arg, number_arg, numbers, opt_number_arg, Builtin};
use crate::error::EvaluationError;
use crate::registry::{Arity, FunctionResult, ReturnType};
use crate::value::Value;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

pub const FUNCTIONS: &[Builtin] = &[
    def("PMT", Arity::Range { min: 3, max: 5 }, 3, ReturnType::Number,
        "PMT(rate, nper, pv, fv, type)", "Calculates the payment for a loan",
        "PMT(0.05/12, 60, 10000)", pmt),
    def("PV", Arity::Range { min: 3, max: 5 }, 3, ReturnType::Number,
        "PV(rate, nper, pmt, fv, type)", "Calculates the present value of an investment",
        "PV(0.05/12, 60, -200)", pv),
    def("FV", Arity::Range { min: 3, max: 5 }, 3, ReturnType::Number,
        "FV(rate, nper, pmt, pv, type)", "Calculates the future value of an investment",
        "FV(0.05/12, 60, -200, 0)", fv),
    def("NPV", Arity::Variadic(2), 2, ReturnType::Number,
        "NPV(rate, value1, value2, ...)", "Calculates the net present value of an investment",
        "NPV(0.1, -1000, 300, 400, 500)", npv),
    def("IRR", Arity::Range { min: 1, max: 2 }, 1, ReturnType::Number,
        "IRR(values, guess)", "Calculates the internal rate of return",
        "IRR([-1000, 300, 400, 500])", irr),
    def("RATE", Arity::Range { min: 3, max: 6 }, 3, ReturnType::Number,
        "RATE(nper, pmt, pv, fv, type, guess)", "Calculates the interest rate per period",
        "RATE(60, -200, 10000)", rate),
];

fn pmt(args: &[Value]) -> FunctionResult {
    let rate = number_arg("PMT", args, 0)?;
    let nper = number_arg("PMT", args, 1)?;
    let pv = number_arg("PMT", args, 2)?;
    let fv = opt_number_arg("PMT", args, 3, 0.0)?;
    let kind = opt_number_arg("PMT", args, 4, 0.0)?;

    if rate == 0.0 {
        return Ok(Value::Number(-(pv + fv) / nper));
    }
    let pvif = (1.0 + rate).powf(nper);
    Ok(Value::Number(
        -(rate * (pv * pvif + fv)) / ((pvif - 1.0) * (1.0 + rate * kind)),
    ))
}

fn pv(args: &[Value]) -> FunctionResult {
    let rate = number_arg("PV", args, 0)?;
    let nper = number_arg("PV", args, 1)?;
    let payment = number_arg("PV", args, 2)?;
    let fv = opt_number_arg("PV", args, 3, 0.0)?;
    let kind = opt_number_arg("PV", args, 4, 0.0)?;

    if rate == 0.0 {
        return Ok(Value::Number(-(payment * nper + fv)));
    }
    let pvif = (1.0 + rate).powf(nper);
    Ok(Value::Number(
        -(payment * (1.0 + rate * kind) * (pvif - 1.0) / rate + fv) / pvif,
    ))
}

fn fv(args: &[Value]) -> FunctionResult {
    let rate = number_arg("FV", args, 0)?;
    let nper = number_arg("FV", args, 1)?;
    let payment = number_arg("FV", args, 2)?;
    let pv = opt_number_arg("FV", args, 3, 0.0)?;
    let kind = opt_number_arg("FV", args, 4, 0.0)?;

    if rate == 0.0 {
        return Ok(Value::Number(-(pv + payment * nper)));
    }
    let fvif = (1.0 + rate).powf(nper);
    Ok(Value::Number(
        -(pv * fvif + payment * (1.0 + rate * kind) * (fvif - 1.0) / rate),
    ))
}

/// Cash flows are discounted starting at period 1.
fn npv(args: &[Value]) -> FunctionResult {
    let rate = number_arg("NPV", args, 0)?;
    let flows = numbers("NPV", args.get(1..).unwrap_or_default())?;
    let total = flows
        .iter()
        .enumerate()
        .map(|(i, value)| value / (1.0 + rate).powi(i as i32 + 1))
        .sum();
    Ok(Value::Number(total))
}

/// Newton-Raphson from `guess`; the last estimate is returned if the
/// iteration budget runs out.
fn newton(mut estimate: f64, f: impl Fn(f64) -> (f64, f64)) -> f64 {
    for _ in 0..MAX_ITERATIONS {
        let (value, slope) = f(estimate);
        if value.abs() < TOLERANCE {
            break;
        }
        estimate -= value / slope;
    }
    estimate
}

fn irr(args: &[Value]) -> FunctionResult {
    let flows = numbers("IRR", &list_arg(args, 0))?;
    if flows.is_empty() {
        return Err(EvaluationError::invalid_argument("IRR", "no cash flows"));
    }
    let guess = opt_number_arg("IRR", args, 1, 0.1)?;

    Ok(Value::Number(newton(guess, |rate| {
        let mut npv = 0.0;
        let mut slope = 0.0;
        for (j, value) in flows.iter().enumerate() {
            let j = j as f64;
            npv += value / (1.0 + rate).powf(j);
            slope -= j * value / (1.0 + rate).powf(j + 1.0);
        }
        (npv, slope)
    })))
}

fn rate(args: &[Value]) -> FunctionResult {
    let nper = number_arg("RATE", args, 0)?;
    let payment = number_arg("RATE", args, 1)?;
    let pv = number_arg("RATE", args, 2)?;
    let fv = opt_number_arg("RATE", args, 3, 0.0)?;
    let kind = opt_number_arg("RATE", args, 4, 0.0)?;
    let guess = opt_number_arg("RATE", args, 5, 0.1)?;

    Ok(Value::Number(newton(guess, |r| {
        let growth = (1.0 + r).powf(nper);
        let value = pv * growth + payment * (1.0 + r * kind) * (growth - 1.0) / r + fv;
        let slope = nper * pv * (1.0 + r).powf(nper - 1.0)
            + payment
                * (1.0 + r * kind)
                * (nper * (1.0 + r).powf(nper - 1.0) / r - (growth - 1.0) / (r * r));
        (value, slope)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    fn number(value: Value) -> f64 {
        match value {
            Value::Number(x) => x,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_pmt() {
        let payment = number(pmt(&[n(0.05 / 12.0), n(60.0), n(10000.0)]).unwrap());
        assert!((payment - -188.7123).abs() < 1e-3, "{}", payment);
        assert_eq!(pmt(&[n(0.0), n(10.0), n(1000.0)]).unwrap(), n(-100.0));
    }

    #[test]
    fn test_pv_and_fv_are_consistent() {
        let present = number(pv(&[n(0.05 / 12.0), n(60.0), n(-200.0)]).unwrap());
        assert!((present - 10598.1).abs() < 0.1, "{}", present);

        let future = number(fv(&[n(0.05 / 12.0), n(60.0), n(-200.0), n(0.0)]).unwrap());
        assert!((future - 13601.2).abs() < 0.1, "{}", future);

        assert_eq!(fv(&[n(0.0), n(10.0), n(-100.0)]).unwrap(), n(1000.0));
    }

    #[test]
    fn test_npv() {
        let value = number(npv(&[n(0.1), n(-1000.0), n(300.0), n(400.0), n(500.0)]).unwrap());
        assert!((value - -19.1244).abs() < 1e-3, "{}", value);
    }

    #[test]
    fn test_irr_converges() {
        let flows = Value::from(vec![-1000.0, 300.0, 400.0, 500.0]);
        let rate = number(irr(&[flows]).unwrap());
        assert!((rate - 0.0889633).abs() < 1e-5, "{}", rate);
    }

    #[test]
    fn test_rate_recovers_pmt_rate() {
        let monthly = 0.01;
        let payment = number(pmt(&[n(monthly), n(36.0), n(5000.0)]).unwrap());
        let solved = number(rate(&[n(36.0), n(payment), n(5000.0)]).unwrap());
        assert!((solved - monthly).abs() < 1e-6, "{}", solved);
    }
}
