use napi::Result as NapiResult;
use napi_derive::napi;

use lease_projection_core::analysis::{self, SensitivityInput};
use lease_projection_core::assumptions::{parse_input, ProjectionInput};
use lease_projection_core::{run_projection, Fingerprint};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_projection(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json).map_err(to_napi_error)?;
    let output = run_projection(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn projection_fingerprint(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json).map_err(to_napi_error)?;
    let fingerprint = Fingerprint::of(&input).map_err(to_napi_error)?;
    Ok(fingerprint.to_string())
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_proposals(inputs_json: String) -> NapiResult<String> {
    let inputs: Vec<ProjectionInput> =
        serde_json::from_str(&inputs_json).map_err(to_napi_error)?;
    let output = analysis::compare_proposals(&inputs).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sensitivity_analysis(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = analysis::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
