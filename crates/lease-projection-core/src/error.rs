use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaseProjectionError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Schedule out of range: {field} reference year {reference_year} is after series end {series_end}")]
    ScheduleOutOfRange {
        field: String,
        reference_year: i32,
        series_end: i32,
    },

    #[error("Inconsistent timeline: {0}")]
    InconsistentTimeline(String),

    #[error("Unknown CapEx category: {0}")]
    UnknownCategory(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LeaseProjectionError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LeaseProjectionError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised while checking a proposal's configuration,
    /// i.e. before any period was simulated.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            LeaseProjectionError::InvalidInput { .. }
                | LeaseProjectionError::ScheduleOutOfRange { .. }
                | LeaseProjectionError::InconsistentTimeline(_)
                | LeaseProjectionError::UnknownCategory(_)
        )
    }
}

impl From<serde_json::Error> for LeaseProjectionError {
    fn from(e: serde_json::Error) -> Self {
        LeaseProjectionError::SerializationError(e.to_string())
    }
}
