pub mod error;
pub mod time_value;
pub mod types;

pub mod assumptions;
pub mod cache;
pub mod capex;
pub mod projection;
pub mod rent;
pub mod schedule;

#[cfg(feature = "analysis")]
pub mod analysis;

#[cfg(feature = "collaborators")]
pub mod collaborators;

pub use assumptions::ProjectionInput;
pub use cache::{CalculationCache, Fingerprint};
pub use error::LeaseProjectionError;
pub use projection::engine::{run_projection, run_projection_at, CalculationEngineOutput};
pub use types::*;

/// Standard result type for all lease-projection operations
pub type LeaseProjectionResult<T> = Result<T, LeaseProjectionError>;
