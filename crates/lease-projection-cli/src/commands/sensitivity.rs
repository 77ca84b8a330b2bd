use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use lease_projection_core::analysis::{run_sensitivity, SensitivityDriver, SensitivityInput};
use lease_projection_core::SensitivityVariable;

use crate::input;

/// Arguments for an NPV sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to the base-case proposal file
    #[arg(long)]
    pub input: Option<String>,

    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "discount_rate:0.06:0.10:0.01")
    #[arg(long)]
    pub var1: String,

    /// Second sensitivity variable (optional, creates a 2D table)
    #[arg(long)]
    pub var2: Option<String>,
}

#[derive(Debug, Serialize)]
struct SensitivityRow {
    var1_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    var2_value: Option<Decimal>,
    npv: Option<Decimal>,
}

fn parse_sens_var(spec: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    // Reject unknown drivers before running the base case
    let driver: SensitivityDriver = parts[0].parse()?;
    Ok(SensitivityVariable {
        name: driver.name().to_string(),
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

pub fn run_sensitivity_cmd(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base = input::load_proposal(args.input.as_deref())?;
    let sweep = SensitivityInput {
        base,
        variable_1: parse_sens_var(&args.var1)?,
        variable_2: args.var2.as_deref().map(parse_sens_var).transpose()?,
    };
    let output = run_sensitivity(&sweep)?;

    let mut results = Vec::new();
    for (i, v1) in output.variable_1_values.iter().enumerate() {
        if output.variable_2_values.is_empty() {
            results.push(SensitivityRow {
                var1_value: *v1,
                var2_value: None,
                npv: output.matrix[i][0].map(|v| v.round_dp(2)),
            });
        } else {
            for (j, v2) in output.variable_2_values.iter().enumerate() {
                results.push(SensitivityRow {
                    var1_value: *v1,
                    var2_value: Some(*v2),
                    npv: output.matrix[i][j].map(|v| v.round_dp(2)),
                });
            }
        }
    }

    Ok(json!({
        "var1_name": output.variable_1_name,
        "var2_name": output.variable_2_name,
        "base_case_value": output.base_case_value.round_dp(2),
        "base_case_position": output.base_case_position,
        "results": results,
        "warnings": output.warnings,
    }))
}
