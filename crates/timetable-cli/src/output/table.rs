use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_cell, result_of, scalar_columns};

/// Format output as tables using the tabled crate: one summary table per
/// object and one row per term for timetables.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(map) => print_section(None, map),
        Value::Array(arr) => print_rows(arr),
        other => println!("{}", other),
    }

    let Some(envelope) = value.as_object() else {
        return;
    };
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_section(title: Option<&str>, map: &Map<String, Value>) {
    if let Some(title) = title {
        println!("\n{}", title);
    }

    let scalars = scalar_columns(map);
    if !scalars.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for key in &scalars {
            builder.push_record([key.as_str(), &format_cell(&map[key.as_str()])]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        match val {
            Value::Object(inner) => print_section(Some(key.as_str()), inner),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                println!("\n{}", key);
                print_rows(items);
            }
            _ => {}
        }
    }
}

fn print_rows(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_cell(item));
        }
        return;
    };

    let headers = scalar_columns(first);
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
