use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Sensitivity variable specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub name: String,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Metadata attached to every engine output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub methodology: String,
    pub precision: String,
}

impl ComputationMetadata {
    pub fn new(methodology: &str) -> Self {
        ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            methodology: methodology.to_string(),
            precision: "rust_decimal_128bit".to_string(),
        }
    }
}
