use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LeaseProjectionError;
use crate::types::{Money, Rate};
use crate::LeaseProjectionResult;

/// A value that grows in discrete steps: once per full `frequency_years`
/// elapsed since `reference_year`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSchedule {
    /// Value effective at the reference year
    pub base_value: Money,
    pub growth_rate: Rate,
    pub frequency_years: u32,
    pub reference_year: i32,
}

impl StepSchedule {
    /// Number of growth steps applied by `year`. Zero before the reference year.
    pub fn steps_at(&self, year: i32) -> u32 {
        if year <= self.reference_year || self.frequency_years == 0 {
            return 0;
        }
        (year - self.reference_year) as u32 / self.frequency_years
    }

    /// Value effective in `year`.
    pub fn value_in(&self, year: i32) -> Money {
        self.base_value * compound(self.growth_rate, self.steps_at(year))
    }

    pub fn validate(&self, field: &str, series_end: i32) -> LeaseProjectionResult<()> {
        if self.frequency_years == 0 {
            return Err(LeaseProjectionError::invalid(
                format!("{field}.frequency_years"),
                "Step frequency must be at least one year",
            ));
        }
        if self.base_value < Decimal::ZERO {
            return Err(LeaseProjectionError::invalid(
                format!("{field}.base_value"),
                format!("Value must be non-negative, got {}", self.base_value),
            ));
        }
        if self.growth_rate <= -Decimal::ONE {
            return Err(LeaseProjectionError::invalid(
                format!("{field}.growth_rate"),
                format!("Growth rate must be greater than -100%, got {}", self.growth_rate),
            ));
        }
        if self.reference_year > series_end {
            return Err(LeaseProjectionError::ScheduleOutOfRange {
                field: field.to_string(),
                reference_year: self.reference_year,
                series_end,
            });
        }
        Ok(())
    }
}

/// `(1 + rate)^steps` by repeated multiplication, exact for decimal rates.
pub fn compound(rate: Rate, steps: u32) -> Decimal {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..steps {
        result *= factor;
    }
    result
}
