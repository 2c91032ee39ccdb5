//! String functions. Positions are 1-based and counted in characters.

use super::{def, number_arg, opt_number_arg, text_arg, Builtin};
use crate::registry::{Arity, FunctionResult, ReturnType};
use crate::value::Value;

pub const FUNCTIONS: &[Builtin] = &[
    def("CONCAT", Arity::Variadic(0), 2, ReturnType::String,
        "CONCAT(text1, text2, ...)", "Concatenates two or more text strings",
        r#"CONCAT("Hello", " ", "World")"#, concat),
    def("LEFT", Arity::Fixed(2), 2, ReturnType::String,
        "LEFT(text, num_chars)", "Returns the leftmost characters from a text string",
        r#"LEFT("Hello World", 5)"#, left),
    def("RIGHT", Arity::Fixed(2), 2, ReturnType::String,
        "RIGHT(text, num_chars)", "Returns the rightmost characters from a text string",
        r#"RIGHT("Hello World", 5)"#, right),
    def("MID", Arity::Fixed(3), 3, ReturnType::String,
        "MID(text, start_num, num_chars)", "Returns characters from the middle of a text string",
        r#"MID("Hello World", 3, 5)"#, mid),
    def("LEN", Arity::Fixed(1), 1, ReturnType::Number,
        "LEN(text)", "Returns the length of a text string",
        r#"LEN("Hello World")"#, len),
    def("UPPER", Arity::Fixed(1), 1, ReturnType::String,
        "UPPER(text)", "Converts text to uppercase",
        r#"UPPER("hello")"#, upper),
    def("LOWER", Arity::Fixed(1), 1, ReturnType::String,
        "LOWER(text)", "Converts text to lowercase",
        r#"LOWER("HELLO")"#, lower),
    def("TRIM", Arity::Fixed(1), 1, ReturnType::String,
        "TRIM(text)", "Removes extra spaces from text",
        r#"TRIM("  Hello World  ")"#, trim),
    def("REPLACE", Arity::Fixed(4), 4, ReturnType::String,
        "REPLACE(old_text, start_num, num_chars, new_text)",
        "Replaces part of a text string with different text",
        r#"REPLACE("Hello World", 7, 5, "Excel")"#, replace),
    def("SUBSTITUTE", Arity::Range { min: 3, max: 4 }, 3, ReturnType::String,
        "SUBSTITUTE(text, old_text, new_text, instance_num)",
        "Substitutes old text with new text in a string",
        r#"SUBSTITUTE("Hello World", "World", "Excel")"#, substitute),
    def("FIND", Arity::Range { min: 2, max: 3 }, 2, ReturnType::Number,
        "FIND(find_text, within_text, start_num)",
        "Finds one text string within another (case-sensitive)",
        r#"FIND("World", "Hello World")"#, find),
    def("SEARCH", Arity::Range { min: 2, max: 3 }, 2, ReturnType::Number,
        "SEARCH(find_text, within_text, start_num)",
        "Finds one text string within another (case-insensitive)",
        r#"SEARCH("world", "Hello World")"#, search),
];

/// Clamps a possibly negative or fractional count to a usize.
fn count(n: f64) -> usize {
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        n.trunc() as usize
    }
}

/// Converts a 1-based position to a 0-based index, clamping below 1.
fn index_from_position(position: f64) -> usize {
    count(position - 1.0)
}

fn concat(args: &[Value]) -> FunctionResult {
    Ok(Value::String(args.iter().map(Value::as_text).collect()))
}

fn left(args: &[Value]) -> FunctionResult {
    let n = count(number_arg("LEFT", args, 1)?);
    Ok(Value::String(text_arg(args, 0).chars().take(n).collect()))
}

fn right(args: &[Value]) -> FunctionResult {
    let text: Vec<char> = text_arg(args, 0).chars().collect();
    let n = count(number_arg("RIGHT", args, 1)?).min(text.len());
    Ok(Value::String(text[text.len() - n..].iter().collect()))
}

fn mid(args: &[Value]) -> FunctionResult {
    let start = index_from_position(number_arg("MID", args, 1)?);
    let length = count(number_arg("MID", args, 2)?);
    Ok(Value::String(
        text_arg(args, 0).chars().skip(start).take(length).collect(),
    ))
}

fn len(args: &[Value]) -> FunctionResult {
    Ok(Value::Number(text_arg(args, 0).chars().count() as f64))
}

fn upper(args: &[Value]) -> FunctionResult {
    Ok(Value::String(text_arg(args, 0).to_uppercase()))
}

fn lower(args: &[Value]) -> FunctionResult {
    Ok(Value::String(text_arg(args, 0).to_lowercase()))
}

fn trim(args: &[Value]) -> FunctionResult {
    Ok(Value::String(text_arg(args, 0).trim().to_string()))
}

fn replace(args: &[Value]) -> FunctionResult {
    let text: Vec<char> = text_arg(args, 0).chars().collect();
    let start = index_from_position(number_arg("REPLACE", args, 1)?).min(text.len());
    let end = start
        .saturating_add(count(number_arg("REPLACE", args, 2)?))
        .min(text.len());

    let mut result: String = text[..start].iter().collect();
    result.push_str(&text_arg(args, 3));
    result.extend(&text[end..]);
    Ok(Value::String(result))
}

fn substitute(args: &[Value]) -> FunctionResult {
    let text = text_arg(args, 0);
    let old = text_arg(args, 1);
    let new = text_arg(args, 2);
    if old.is_empty() {
        return Ok(Value::String(text));
    }

    match args.get(3) {
        None | Some(Value::Null) => Ok(Value::String(text.replace(&old, &new))),
        Some(_) => {
            let instance = number_arg("SUBSTITUTE", args, 3)?;
            let target = text
                .match_indices(&old)
                .enumerate()
                .find(|(i, _)| (*i + 1) as f64 == instance)
                .map(|(_, (offset, _))| offset);

            Ok(Value::String(match target {
                Some(offset) => format!("{}{}{}", &text[..offset], new, &text[offset + old.len()..]),
                None => text,
            }))
        }
    }
}

/// Shared body of FIND and SEARCH. Returns the 1-based character position,
/// or -1 when the needle is absent.
fn locate(function: &str, args: &[Value], fold_case: bool) -> FunctionResult {
    let (needle, haystack) = if fold_case {
        (text_arg(args, 0).to_lowercase(), text_arg(args, 1).to_lowercase())
    } else {
        (text_arg(args, 0), text_arg(args, 1))
    };
    let start = index_from_position(opt_number_arg(function, args, 2, 1.0)?);

    let haystack: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if start > haystack.len() {
        return Ok(Value::Number(-1.0));
    }
    if needle.is_empty() {
        return Ok(Value::Number((start + 1) as f64));
    }

    let position = haystack[start..]
        .windows(needle.len())
        .position(|window| window == needle.as_slice());
    Ok(Value::Number(match position {
        Some(offset) => (start + offset + 1) as f64,
        None => -1.0,
    }))
}

fn find(args: &[Value]) -> FunctionResult {
    locate("FIND", args, false)
}

fn search(args: &[Value]) -> FunctionResult {
    locate("SEARCH", args, true)
}
