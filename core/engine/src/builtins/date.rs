//! Date and time functions over timezone-naive local timestamps.
//! Date arguments accept DateTime values or ISO-style text.

use super::{date_arg, def, int_arg, list_arg, opt_number_arg, text_arg, Builtin};
use crate::error::{EvalResult, EvaluationError};
use crate::registry::{Arity, FunctionResult, ReturnType};
use crate::value::Value;
use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, Timelike, Weekday};
use std::collections::HashSet;

/// Upper bound on days walked by WORKDAY and NETWORKDAYS.
const MAX_DAY_SPAN: u64 = 1_000_000;

pub const FUNCTIONS: &[Builtin] = &[
    def("NOW", Arity::Fixed(0), 0, ReturnType::Date,
        "NOW()", "Returns the current date and time",
        "NOW()", now),
    def("TODAY", Arity::Fixed(0), 0, ReturnType::Date,
        "TODAY()", "Returns the current date",
        "TODAY()", today),
    def("DATE", Arity::Fixed(3), 3, ReturnType::Date,
        "DATE(year, month, day)", "Creates a date from year, month, and day",
        "DATE(2024, 1, 15)", date),
    def("TIME", Arity::Fixed(3), 3, ReturnType::Date,
        "TIME(hour, minute, second)", "Creates a time from hour, minute, and second",
        "TIME(14, 30, 0)", time),
    def("YEAR", Arity::Fixed(1), 1, ReturnType::Number,
        "YEAR(date)", "Returns the year from a date",
        "YEAR(NOW())", year),
    def("MONTH", Arity::Fixed(1), 1, ReturnType::Number,
        "MONTH(date)", "Returns the month from a date",
        "MONTH(NOW())", month),
    def("DAY", Arity::Fixed(1), 1, ReturnType::Number,
        "DAY(date)", "Returns the day from a date",
        "DAY(NOW())", day),
    def("WEEKDAY", Arity::Range { min: 1, max: 2 }, 2, ReturnType::Number,
        "WEEKDAY(date, return_type)", "Returns the day of the week as a number",
        "WEEKDAY(TODAY(), 1)", weekday),
    def("HOUR", Arity::Fixed(1), 1, ReturnType::Number,
        "HOUR(time)", "Returns the hour from a time",
        "HOUR(NOW())", hour),
    def("MINUTE", Arity::Fixed(1), 1, ReturnType::Number,
        "MINUTE(time)", "Returns the minute from a time",
        "MINUTE(NOW())", minute),
    def("SECOND", Arity::Fixed(1), 1, ReturnType::Number,
        "SECOND(time)", "Returns the second from a time",
        "SECOND(NOW())", second),
    def("DATEDIF", Arity::Fixed(3), 3, ReturnType::Number,
        "DATEDIF(start_date, end_date, unit)", "Calculates the difference between two dates",
        r#"DATEDIF(DATE(2024,1,1), TODAY(), "D")"#, datedif),
    def("WORKDAY", Arity::Range { min: 2, max: 3 }, 2, ReturnType::Date,
        "WORKDAY(start_date, days, holidays)",
        "Returns a date that is a specified number of working days from start date",
        "WORKDAY(TODAY(), 10)", workday),
    def("NETWORKDAYS", Arity::Range { min: 2, max: 3 }, 2, ReturnType::Number,
        "NETWORKDAYS(start_date, end_date, holidays)",
        "Returns the number of working days between two dates",
        "NETWORKDAYS(DATE(2024,1,1), TODAY())", networkdays),
];

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

fn out_of_range(function: &str) -> EvaluationError {
    EvaluationError::invalid_argument(function, "date out of range")
}

/// Builds a date from possibly out-of-range parts: month 13 rolls into the
/// next year and day 0 is the last day of the previous month.
fn normalized_date(function: &str, year: i64, month: i64, day: i64) -> EvalResult<NaiveDate> {
    let year = i32::try_from(year).map_err(|_| out_of_range(function))?;
    let base = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| out_of_range(function))?;

    let month_offset = month - 1;
    let months = u32::try_from(month_offset.unsigned_abs()).map_err(|_| out_of_range(function))?;
    let shifted = if month_offset >= 0 {
        base.checked_add_months(Months::new(months))
    } else {
        base.checked_sub_months(Months::new(months))
    }
    .ok_or_else(|| out_of_range(function))?;

    shifted
        .checked_add_signed(Duration::try_days(day - 1).ok_or_else(|| out_of_range(function))?)
        .ok_or_else(|| out_of_range(function))
}

fn now(_args: &[Value]) -> FunctionResult {
    Ok(Value::DateTime(Local::now().naive_local()))
}

fn today(_args: &[Value]) -> FunctionResult {
    Ok(Value::DateTime(midnight(Local::now().date_naive())))
}

fn date(args: &[Value]) -> FunctionResult {
    let year = int_arg("DATE", args, 0)?;
    let month = int_arg("DATE", args, 1)?;
    let day = int_arg("DATE", args, 2)?;
    Ok(Value::DateTime(midnight(normalized_date("DATE", year, month, day)?)))
}

/// Today's date at the given time of day; overflowing parts carry over.
fn time(args: &[Value]) -> FunctionResult {
    let hours = int_arg("TIME", args, 0)?;
    let minutes = int_arg("TIME", args, 1)?;
    let seconds = int_arg("TIME", args, 2)?;
    let offset = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| out_of_range("TIME"))?;

    midnight(Local::now().date_naive())
        .checked_add_signed(offset)
        .map(Value::DateTime)
        .ok_or_else(|| out_of_range("TIME"))
}

fn component(function: &str, args: &[Value], part: fn(&NaiveDateTime) -> u32) -> FunctionResult {
    let dt = date_arg(function, args, 0)?;
    Ok(Value::Number(part(&dt) as f64))
}

fn year(args: &[Value]) -> FunctionResult {
    let dt = date_arg("YEAR", args, 0)?;
    Ok(Value::Number(dt.year() as f64))
}

fn month(args: &[Value]) -> FunctionResult {
    component("MONTH", args, |dt| dt.month())
}

fn day(args: &[Value]) -> FunctionResult {
    component("DAY", args, |dt| dt.day())
}

fn hour(args: &[Value]) -> FunctionResult {
    component("HOUR", args, |dt| dt.hour())
}

fn minute(args: &[Value]) -> FunctionResult {
    component("MINUTE", args, |dt| dt.minute())
}

fn second(args: &[Value]) -> FunctionResult {
    component("SECOND", args, |dt| dt.second())
}

/// Type 1 (default): Monday = 1 .. Sunday = 7. Type 2: Sunday = 1 ..
/// Saturday = 7. Any other type: Sunday = 0 .. Saturday = 6.
fn weekday(args: &[Value]) -> FunctionResult {
    let dt = date_arg("WEEKDAY", args, 0)?;
    let return_type = opt_number_arg("WEEKDAY", args, 1, 1.0)?;
    let day = dt.weekday();
    let number = if return_type == 1.0 {
        day.number_from_monday()
    } else if return_type == 2.0 {
        day.number_from_sunday()
    } else {
        day.num_days_from_sunday()
    };
    Ok(Value::Number(number as f64))
}

fn whole_days(delta: Duration) -> f64 {
    (delta.num_seconds() as f64 / 86_400.0).floor()
}

fn datedif(args: &[Value]) -> FunctionResult {
    let start = date_arg("DATEDIF", args, 0)?;
    let end = date_arg("DATEDIF", args, 1)?;
    let unit = text_arg(args, 2).to_uppercase();

    let years = (end.year() - start.year()) as f64;
    let months = end.month() as f64 - start.month() as f64;
    let result = match unit.as_str() {
        "M" => years * 12.0 + months,
        "Y" => years,
        "YM" => months,
        "YD" => {
            let anniversary = normalized_date(
                "DATEDIF",
                end.year() as i64,
                start.month() as i64,
                start.day() as i64,
            )?;
            whole_days(end - midnight(anniversary))
        }
        "MD" => end.day() as f64 - start.day() as f64,
        _ => whole_days(end - start),
    };
    Ok(Value::Number(result))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn holidays(function: &str, args: &[Value], index: usize) -> EvalResult<HashSet<NaiveDate>> {
    list_arg(args, index)
        .iter()
        .flat_map(Value::flatten)
        .filter(|value| !value.is_null())
        .map(|value| date_arg(function, std::slice::from_ref(&value), 0).map(|dt| dt.date()))
        .collect()
}

fn workday(args: &[Value]) -> FunctionResult {
    let start = date_arg("WORKDAY", args, 0)?;
    let days = int_arg("WORKDAY", args, 1)?;
    // int_arg saturates huge inputs to i64::MIN, which has no positive abs
    if days.unsigned_abs() > MAX_DAY_SPAN {
        return Err(EvaluationError::invalid_argument("WORKDAY", "too many days"));
    }
    let skip = holidays("WORKDAY", args, 2)?;
    let step = Duration::days(if days >= 0 { 1 } else { -1 });

    let mut current = start;
    let mut remaining = days.unsigned_abs();
    while remaining > 0 {
        current = current
            .checked_add_signed(step)
            .ok_or_else(|| out_of_range("WORKDAY"))?;
        if !is_weekend(current.date()) && !skip.contains(&current.date()) {
            remaining -= 1;
        }
    }
    Ok(Value::DateTime(current))
}

fn networkdays(args: &[Value]) -> FunctionResult {
    let start = date_arg("NETWORKDAYS", args, 0)?;
    let end = date_arg("NETWORKDAYS", args, 1)?;
    if (end - start).num_days() > MAX_DAY_SPAN as i64 {
        return Err(EvaluationError::invalid_argument("NETWORKDAYS", "range too large"));
    }
    let skip = holidays("NETWORKDAYS", args, 2)?;

    let mut count = 0u32;
    let mut current = start;
    while current <= end {
        if !is_weekend(current.date()) && !skip.contains(&current.date()) {
            count += 1;
        }
        current = match current.checked_add_signed(Duration::days(1)) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::Number(count as f64))
}
