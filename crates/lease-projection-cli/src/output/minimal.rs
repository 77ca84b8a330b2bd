use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks for well-known headline fields in order of priority, descending
/// into `metrics` for projection output, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("metrics"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = ["npv", "best_proposal", "base_case_value", "irr"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    if let Value::Array(rows) = result_obj {
        println!("{} rows", rows.len());
        return;
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "undefined".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
