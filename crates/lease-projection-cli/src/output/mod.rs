pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use colored::Colorize;
use serde_json::Value;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
    flag_inconsistencies(value);
}

/// Runs whose statements failed the balance or reconciliation check are
/// still printed, but never without a visible notice on stderr.
fn flag_inconsistencies(value: &Value) {
    let failed = inconsistent_labels(value);
    if !failed.is_empty() {
        eprintln!(
            "{}: consistency checks failed for {}; figures are unverified",
            "warning".yellow().bold(),
            failed.join(", ")
        );
    }
}

fn inconsistent_labels(value: &Value) -> Vec<String> {
    let passed = |v: &Value, key: &str| v.get(key).and_then(Value::as_bool).unwrap_or(true);

    match value {
        Value::Object(map) => {
            if let Some(validation) = map.get("validation") {
                if !passed(validation, "all_periods_balanced")
                    || !passed(validation, "all_cash_flows_reconciled")
                {
                    let name = map
                        .get("proposal_name")
                        .and_then(Value::as_str)
                        .unwrap_or("projection");
                    return vec![name.to_string()];
                }
                return Vec::new();
            }
            match map.get("proposals") {
                Some(Value::Array(proposals)) => proposals
                    .iter()
                    .filter(|p| {
                        !passed(*p, "all_periods_balanced")
                            || !passed(*p, "all_cash_flows_reconciled")
                    })
                    .filter_map(|p| p.get("proposal_name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            }
        }
        Value::Array(rows) => rows
            .iter()
            .filter(|r| !passed(*r, "balanced") || !passed(*r, "reconciled"))
            .filter_map(|r| r.get("year").map(|y| format!("year {y}")))
            .collect(),
        _ => Vec::new(),
    }
}
