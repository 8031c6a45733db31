use serde_json::Value;
use std::io;

use super::{format_cell, result_of, scalar_columns, timetable_terms};

/// Write output as CSV to stdout: one row per term when the result holds a
/// timetable, `field,value` pairs otherwise.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    if let Some(terms) = timetable_terms(result) {
        write_terms(&mut wtr, terms);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for key in scalar_columns(map) {
            let _ = wtr.write_record([key.as_str(), &format_cell(&map[key.as_str()])]);
        }
    } else {
        let _ = wtr.write_record([&format_cell(result)]);
    }

    let _ = wtr.flush();
}

fn write_terms(wtr: &mut csv::Writer<io::StdoutLock<'_>>, terms: &[Value]) {
    let Some(Value::Object(first)) = terms.first() else {
        return;
    };

    let headers = scalar_columns(first);
    let _ = wtr.write_record(&headers);
    for term in terms {
        if let Value::Object(map) = term {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
