pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use tracing::debug;

use lease_projection_core::assumptions::{validate_input, ProjectionInput};

/// Load a proposal from `--input` or piped stdin and check it before any
/// period is simulated.
pub fn load_proposal(path: Option<&str>) -> Result<ProjectionInput, Box<dyn std::error::Error>> {
    let proposal: ProjectionInput = if let Some(path) = path {
        file::read_input(path)?
    } else if let Some(text) = stdin::read_stdin()? {
        parse_document(&text, None)?
    } else {
        return Err("--input <proposal.json|yaml> or stdin required".into());
    };
    validate_input(&proposal)?;
    debug!(
        proposal = %proposal.proposal_name,
        source = path.unwrap_or("stdin"),
        "proposal loaded"
    );
    Ok(proposal)
}

/// Parse JSON or YAML. Without a hint, a document opening with `{` is JSON.
pub fn parse_document<T: DeserializeOwned>(
    text: &str,
    yaml_hint: Option<bool>,
) -> Result<T, Box<dyn std::error::Error>> {
    let yaml = yaml_hint.unwrap_or_else(|| !text.trim_start().starts_with('{'));
    if yaml {
        Ok(serde_yaml::from_str(text)?)
    } else {
        Ok(serde_json::from_str(text)?)
    }
}
