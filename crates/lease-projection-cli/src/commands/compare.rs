use clap::Args;
use serde_json::Value;

use lease_projection_core::analysis::compare_proposals;

use crate::input;

/// Arguments for ranking proposals
#[derive(Args)]
pub struct CompareArgs {
    /// Proposal files to compare; repeat for each proposal
    #[arg(long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.inputs.len() < 2 {
        return Err("compare needs at least two --input proposals".into());
    }
    let proposals = args
        .inputs
        .iter()
        .map(|path| input::load_proposal(Some(path.as_str())))
        .collect::<Result<Vec<_>, _>>()?;
    let result = compare_proposals(&proposals)?;
    Ok(serde_json::to_value(result)?)
}
