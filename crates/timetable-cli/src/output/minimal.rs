use serde_json::Value;

use super::{format_cell, result_of};

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority (on the borrower
/// timetable for a lender split), then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);
    let summary = result.get("borrower").unwrap_or(result);

    let priority_keys = ["total_interests", "total_payments", "valid"];

    if let Value::Object(map) = summary {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_cell(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_cell(val));
            return;
        }
    }

    println!("{}", format_cell(summary));
}
