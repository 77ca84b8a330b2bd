pub mod proposal;
pub mod sample;
pub mod validation;

pub use proposal::*;
pub use sample::example_input;
pub use validation::{parse_input, validate_input};

#[cfg(test)]
pub(crate) use sample::example_input as sample_input;
