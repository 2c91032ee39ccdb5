//! Selection and lookup functions over list values. Indexes are 1-based;
//! out-of-range positions yield null rather than an error.

use super::{arg, def, list_arg, loosely_equal, number_arg, opt_number_arg, Builtin};
use crate::registry::{Arity, FunctionResult, ReturnType};
use crate::value::Value;
use std::cmp::Ordering;

pub const FUNCTIONS: &[Builtin] = &[
    def("CHOOSE", Arity::Variadic(2), 3, ReturnType::Any,
        "CHOOSE(index_num, value1, value2, ...)", "Chooses a value from a list based on index",
        r#"CHOOSE(2, "Apple", "Orange", "Banana")"#, choose),
    def("INDEX", Arity::Range { min: 2, max: 3 }, 2, ReturnType::Any,
        "INDEX(array, row_num, col_num)", "Returns a value from an array at specified position",
        "INDEX([1,2,3,4], 2)", index),
    def("MATCH", Arity::Range { min: 2, max: 3 }, 2, ReturnType::Number,
        "MATCH(lookup_value, lookup_array, match_type)",
        "Returns the position of a value in an array",
        r#"MATCH("Orange", ["Apple","Orange","Banana"], 0)"#, match_fn),
    def("VLOOKUP", Arity::Range { min: 3, max: 4 }, 3, ReturnType::Any,
        "VLOOKUP(lookup_value, table_array, col_index_num, range_lookup)",
        "Looks up a value in the first column and returns a value in the same row",
        r#"VLOOKUP("Apple", table, 2, false)"#, vlookup),
    def("HLOOKUP", Arity::Range { min: 3, max: 4 }, 3, ReturnType::Any,
        "HLOOKUP(lookup_value, table_array, row_index_num, range_lookup)",
        "Looks up a value in the first row and returns a value in the same column",
        r#"HLOOKUP("Q1", table, 2, false)"#, hlookup),
];

/// Converts a 1-based position to a 0-based index.
fn position(n: f64) -> Option<usize> {
    let n = n.floor();
    if n >= 1.0 && n.is_finite() {
        Some(n as usize - 1)
    } else {
        None
    }
}

fn nth(items: &[Value], one_based: f64) -> Value {
    position(one_based)
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or(Value::Null)
}

fn choose(args: &[Value]) -> FunctionResult {
    let choice = number_arg("CHOOSE", args, 0)?;
    Ok(nth(args.get(1..).unwrap_or_default(), choice))
}

/// One-dimensional lists take a row number only; a list of lists is
/// addressed by row then column.
fn index(args: &[Value]) -> FunctionResult {
    let items = list_arg(args, 0);
    let row = number_arg("INDEX", args, 1)?;
    let column = opt_number_arg("INDEX", args, 2, 1.0)?;

    Ok(match items.first() {
        Some(Value::List(_)) => match nth(&items, row) {
            Value::List(cells) => nth(&cells, column),
            _ => Value::Null,
        },
        _ => nth(&items, row),
    })
}

fn ordering_is(a: &Value, b: &Value, wanted: &[Ordering]) -> bool {
    a.compare(b).is_some_and(|ord| wanted.contains(&ord))
}

/// Type 0: exact match. Type 1: first item >= lookup. Type -1: first item
/// <= lookup. Returns -1 when nothing qualifies.
fn match_fn(args: &[Value]) -> FunctionResult {
    let lookup = arg(args, 0);
    let items = list_arg(args, 1);
    let match_type = opt_number_arg("MATCH", args, 2, 1.0)?;

    let found = items.iter().position(|item| {
        if match_type == 0.0 {
            loosely_equal(item, lookup)
        } else if match_type == 1.0 {
            ordering_is(item, lookup, &[Ordering::Greater, Ordering::Equal])
        } else if match_type == -1.0 {
            ordering_is(item, lookup, &[Ordering::Less, Ordering::Equal])
        } else {
            false
        }
    });
    Ok(Value::Number(found.map_or(-1.0, |i| (i + 1) as f64)))
}

/// Finds the slot of `lookup` among `keys`. Approximate matching assumes
/// ascending keys and picks the last key not greater than `lookup`.
fn lookup_slot(lookup: &Value, keys: &[Value], approximate: bool) -> Option<usize> {
    let not_greater = |key: &Value| ordering_is(key, lookup, &[Ordering::Less, Ordering::Equal]);
    if !approximate {
        return keys.iter().position(|key| loosely_equal(key, lookup));
    }
    (0..keys.len()).find(|&i| {
        not_greater(&keys[i]) && keys.get(i + 1).map_or(true, |next| !not_greater(next))
    })
}

fn approximate_flag(args: &[Value]) -> bool {
    match args.get(3) {
        None | Some(Value::Null) => true,
        Some(flag) => flag.is_truthy(),
    }
}

fn rows(table: &Value) -> Vec<Vec<Value>> {
    match table {
        Value::List(rows) => rows
            .iter()
            .map(|row| match row {
                Value::List(cells) => cells.clone(),
                other => vec![other.clone()],
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn vlookup(args: &[Value]) -> FunctionResult {
    let table = rows(arg(args, 1));
    let column = number_arg("VLOOKUP", args, 2)?;
    let keys: Vec<Value> = table
        .iter()
        .map(|row| row.first().cloned().unwrap_or(Value::Null))
        .collect();

    Ok(lookup_slot(arg(args, 0), &keys, approximate_flag(args))
        .map(|slot| nth(&table[slot], column))
        .unwrap_or(Value::Null))
}

fn hlookup(args: &[Value]) -> FunctionResult {
    let table = rows(arg(args, 1));
    let row = number_arg("HLOOKUP", args, 2)?;
    let keys = table.first().cloned().unwrap_or_default();

    Ok(lookup_slot(arg(args, 0), &keys, approximate_flag(args))
        .and_then(|slot| {
            position(row)
                .and_then(|r| table.get(r))
                .and_then(|cells| cells.get(slot))
                .cloned()
        })
        .unwrap_or(Value::Null))
}
