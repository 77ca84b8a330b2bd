use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LeaseProjectionError;
use crate::types::{Money, Rate};
use crate::LeaseProjectionResult;

/// When an auto-reinvestment purchase happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReinvestmentTrigger {
    /// Contract offsets `years`, `2 * years`, ...
    EveryYears { years: u32 },
    /// Replace each asset the year after its last depreciation charge
    OnFullDepreciation,
}

/// How large an auto-reinvestment purchase is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReinvestmentSizing {
    FixedAmount { amount: Money },
    /// Percentage of the reference asset's cost
    PercentOfPriorCost { pct: Rate },
    /// Percentage of the first contract year's revenue. A fixed base keeps
    /// more frequent reinvestment from ever lowering total depreciation.
    PercentOfRevenue { pct: Rate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinvestmentPolicy {
    pub trigger: ReinvestmentTrigger,
    pub sizing: ReinvestmentSizing,
}

impl ReinvestmentTrigger {
    pub fn fires_at_offset(&self, contract_offset: u32) -> bool {
        match self {
            ReinvestmentTrigger::EveryYears { years } => {
                *years > 0 && contract_offset > 0 && contract_offset % years == 0
            }
            ReinvestmentTrigger::OnFullDepreciation => false,
        }
    }
}

impl ReinvestmentSizing {
    /// Purchase amount given the reference asset cost (if any) and the
    /// reference revenue.
    pub fn amount(&self, prior_cost: Option<Money>, revenue: Money) -> Money {
        match self {
            ReinvestmentSizing::FixedAmount { amount } => *amount,
            ReinvestmentSizing::PercentOfPriorCost { pct } => {
                prior_cost.map(|c| c * pct).unwrap_or(Decimal::ZERO)
            }
            ReinvestmentSizing::PercentOfRevenue { pct } => (revenue * pct).max(Decimal::ZERO),
        }
    }
}

impl ReinvestmentPolicy {
    pub fn validate(&self, field: &str) -> LeaseProjectionResult<()> {
        if let ReinvestmentTrigger::EveryYears { years } = self.trigger {
            if years == 0 {
                return Err(LeaseProjectionError::invalid(
                    format!("{field}.trigger.years"),
                    "Reinvestment interval must be at least one year",
                ));
            }
        }
        let (name, value) = match &self.sizing {
            ReinvestmentSizing::FixedAmount { amount } => ("amount", *amount),
            ReinvestmentSizing::PercentOfPriorCost { pct } => ("pct", *pct),
            ReinvestmentSizing::PercentOfRevenue { pct } => ("pct", *pct),
        };
        if value < Decimal::ZERO {
            return Err(LeaseProjectionError::invalid(
                format!("{field}.sizing.{name}"),
                format!("Value must be non-negative, got {value}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_every_years_fires_on_multiples_after_start() {
        let t = ReinvestmentTrigger::EveryYears { years: 5 };
        assert!(!t.fires_at_offset(0));
        assert!(!t.fires_at_offset(4));
        assert!(t.fires_at_offset(5));
        assert!(t.fires_at_offset(10));
    }

    #[test]
    fn test_sizing_amounts() {
        let fixed = ReinvestmentSizing::FixedAmount { amount: dec!(250_000) };
        assert_eq!(fixed.amount(None, dec!(1)), dec!(250_000));

        let prior = ReinvestmentSizing::PercentOfPriorCost { pct: dec!(1.10) };
        assert_eq!(prior.amount(Some(dec!(100_000)), dec!(0)), dec!(110_000));
        assert_eq!(prior.amount(None, dec!(0)), Decimal::ZERO);

        let rev = ReinvestmentSizing::PercentOfRevenue { pct: dec!(0.02) };
        assert_eq!(rev.amount(None, dec!(10_000_000)), dec!(200_000));
    }

    #[test]
    fn test_policy_json_shape() {
        let json = r#"{
            "trigger": {"type": "every_years", "years": 7},
            "sizing": {"type": "percent_of_revenue", "pct": "0.03"}
        }"#;
        let p: ReinvestmentPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p.trigger, ReinvestmentTrigger::EveryYears { years: 7 });
    }

    #[test]
    fn test_zero_interval_rejected() {
        let p = ReinvestmentPolicy {
            trigger: ReinvestmentTrigger::EveryYears { years: 0 },
            sizing: ReinvestmentSizing::FixedAmount { amount: dec!(1) },
        };
        assert!(p.validate("capex.default_policy").is_err());
    }
}
