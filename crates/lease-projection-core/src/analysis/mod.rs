pub mod comparison;
pub mod sensitivity;

pub use comparison::{compare_outputs, compare_proposals, ComparisonOutput, ProposalSummary};
pub use sensitivity::{run_sensitivity, SensitivityDriver, SensitivityInput, SensitivityOutput};
