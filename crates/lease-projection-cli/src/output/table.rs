use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables: scalar fields first, then one table per nested
/// object and per list of flat records.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => print_object(map),
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut scalars = Builder::default();
    scalars.push_record(["Field", "Value"]);
    let mut has_scalars = false;

    for (key, val) in map {
        if is_scalar(val) {
            scalars.push_record([key.as_str(), &format_value(val)]);
            has_scalars = true;
        }
    }
    if has_scalars {
        println!("{}", Table::from(scalars));
    }

    for (key, val) in map {
        match val {
            Value::Object(inner) if key != "metadata" => {
                println!("\n{}:", heading(key));
                print_flat_object(inner);
            }
            Value::Array(arr) if key == "warnings" => print_warnings(arr),
            Value::Array(arr) if is_record_list(arr) => {
                println!("\n{}:", heading(key));
                print_array_table(arr);
            }
            Value::Array(arr) if !arr.is_empty() && !arr.iter().all(is_scalar) => {
                // Rows with nested statements are too wide for a terminal
                println!("\n{}: {} rows (use --output json)", heading(key), arr.len());
            }
            _ => {}
        }
    }

    if let Some(Value::String(meth)) = map
        .get("metadata")
        .and_then(|m| m.get("methodology"))
    {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if let Value::Array(arr) = val {
            if is_record_list(arr) {
                builder.push_record([key.as_str(), &format!("{} entries", arr.len())]);
                continue;
            }
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn print_warnings(warnings: &[Value]) {
    if warnings.is_empty() {
        return;
    }
    println!("\nWarnings:");
    for w in warnings {
        if let Value::String(s) = w {
            println!("  - {}", s);
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Non-empty list of objects whose fields are all scalars.
fn is_record_list(arr: &[Value]) -> bool {
    !arr.is_empty()
        && arr.iter().all(|item| match item {
            Value::Object(map) => map.values().all(is_scalar),
            _ => false,
        })
}

fn heading(key: &str) -> String {
    let mut chars = key.replace('_', " ").chars().collect::<Vec<_>>();
    if let Some(first) = chars.first_mut() {
        *first = first.to_ascii_uppercase();
    }
    chars.into_iter().collect()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
