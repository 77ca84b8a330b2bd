use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LeaseProjectionError;
use crate::LeaseProjectionResult;

/// Linear enrollment ramp-up between two years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampUp {
    pub initial_students: Decimal,
    pub target_students: Decimal,
    pub start_year: i32,
    pub end_year: i32,
}

impl RampUp {
    /// Students in `year`, floored to whole students. Holds the initial value
    /// before `start_year` and the target after `end_year`.
    pub fn students_in(&self, year: i32) -> Decimal {
        if year < self.start_year {
            return self.initial_students;
        }
        if year >= self.end_year {
            return self.target_students;
        }
        let span = Decimal::from(self.end_year - self.start_year);
        let elapsed = Decimal::from(year - self.start_year);
        let value =
            self.initial_students + (self.target_students - self.initial_students) * elapsed / span;
        value.floor()
    }

    pub fn validate(&self, field: &str) -> LeaseProjectionResult<()> {
        if self.initial_students < Decimal::ZERO || self.target_students < Decimal::ZERO {
            return Err(LeaseProjectionError::invalid(
                field,
                "Student counts must be non-negative",
            ));
        }
        if self.end_year < self.start_year {
            return Err(LeaseProjectionError::invalid(
                format!("{field}.end_year"),
                format!(
                    "Ramp-up end year {} precedes start year {}",
                    self.end_year, self.start_year
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ramp() -> RampUp {
        RampUp {
            initial_students: dec!(400),
            target_students: dec!(1000),
            start_year: 2028,
            end_year: 2032,
        }
    }

    #[test]
    fn test_holds_initial_before_start() {
        assert_eq!(ramp().students_in(2025), dec!(400));
    }

    #[test]
    fn test_linear_between_start_and_end() {
        let r = ramp();
        assert_eq!(r.students_in(2028), dec!(400));
        assert_eq!(r.students_in(2029), dec!(550));
        assert_eq!(r.students_in(2030), dec!(700));
        assert_eq!(r.students_in(2031), dec!(850));
        assert_eq!(r.students_in(2032), dec!(1000));
    }

    #[test]
    fn test_clamped_to_target_after_end() {
        assert_eq!(ramp().students_in(2050), dec!(1000));
    }

    #[test]
    fn test_fractional_steps_floor() {
        let r = RampUp {
            initial_students: dec!(0),
            target_students: dec!(100),
            start_year: 2028,
            end_year: 2031,
        };
        // 100 / 3 = 33.33 -> 33
        assert_eq!(r.students_in(2029), dec!(33));
        assert_eq!(r.students_in(2030), dec!(66));
    }

    #[test]
    fn test_single_year_ramp_jumps_to_target() {
        let r = RampUp {
            start_year: 2030,
            end_year: 2030,
            ..ramp()
        };
        assert_eq!(r.students_in(2029), dec!(400));
        assert_eq!(r.students_in(2030), dec!(1000));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let r = RampUp {
            start_year: 2032,
            end_year: 2028,
            ..ramp()
        };
        assert!(r.validate("ramp_up").is_err());
    }
}
