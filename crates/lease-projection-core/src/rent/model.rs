use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LeaseProjectionError;
use crate::schedule::step::StepSchedule;
use crate::types::{Money, Rate};
use crate::LeaseProjectionResult;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Stepped escalation referenced to the contract start year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    pub rate: Rate,
    pub frequency_years: u32,
}

/// How annual rent is priced. Exactly one variant is active per proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RentModel {
    /// Base rent escalated in steps
    FixedEscalation {
        base_rent: Money,
        escalation: Escalation,
    },
    /// Share of the same year's revenue, optionally floored by a guarantee
    RevenueShare {
        share_pct: Rate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_guarantee: Option<Money>,
    },
    /// Yield on the partner's land and construction outlay, then escalated
    PartnerInvestment {
        land_area_sqm: Decimal,
        land_price_per_sqm: Money,
        built_up_area_sqm: Decimal,
        construction_cost_per_sqm: Money,
        yield_rate: Rate,
        escalation: Escalation,
    },
    /// Escalated base rent plus a share of revenue above a threshold
    Hybrid {
        base_rent: Money,
        escalation: Escalation,
        share_pct: Rate,
        revenue_threshold: Money,
    },
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Rent for one year, split into its fixed and revenue-linked parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentCharge {
    pub fixed_component: Money,
    pub revenue_component: Money,
    pub total: Money,
}

impl RentCharge {
    fn fixed(amount: Money) -> Self {
        RentCharge {
            fixed_component: amount,
            revenue_component: Decimal::ZERO,
            total: amount,
        }
    }
}

impl RentModel {
    pub fn name(&self) -> &'static str {
        match self {
            RentModel::FixedEscalation { .. } => "fixed_escalation",
            RentModel::RevenueShare { .. } => "revenue_share",
            RentModel::PartnerInvestment { .. } => "partner_investment",
            RentModel::Hybrid { .. } => "hybrid",
        }
    }

    pub fn escalation(&self) -> Option<&Escalation> {
        match self {
            RentModel::FixedEscalation { escalation, .. }
            | RentModel::PartnerInvestment { escalation, .. }
            | RentModel::Hybrid { escalation, .. } => Some(escalation),
            RentModel::RevenueShare { .. } => None,
        }
    }

    pub fn escalation_mut(&mut self) -> Option<&mut Escalation> {
        match self {
            RentModel::FixedEscalation { escalation, .. }
            | RentModel::PartnerInvestment { escalation, .. }
            | RentModel::Hybrid { escalation, .. } => Some(escalation),
            RentModel::RevenueShare { .. } => None,
        }
    }

    /// Partner's notional capital outlay, only for the partner-investment model.
    pub fn partner_investment(&self) -> Option<Money> {
        match self {
            RentModel::PartnerInvestment {
                land_area_sqm,
                land_price_per_sqm,
                built_up_area_sqm,
                construction_cost_per_sqm,
                ..
            } => Some(
                land_area_sqm * land_price_per_sqm + built_up_area_sqm * construction_cost_per_sqm,
            ),
            _ => None,
        }
    }

    /// Rent charged in `year` given that year's revenue.
    pub fn rent_for(&self, contract_start_year: i32, year: i32, revenue: Money) -> RentCharge {
        match self {
            RentModel::FixedEscalation {
                base_rent,
                escalation,
            } => RentCharge::fixed(escalated(*base_rent, escalation, contract_start_year, year)),
            RentModel::RevenueShare {
                share_pct,
                minimum_guarantee,
            } => {
                let share = revenue * share_pct;
                match minimum_guarantee {
                    Some(guarantee) if *guarantee > share => RentCharge {
                        fixed_component: *guarantee - share,
                        revenue_component: share,
                        total: *guarantee,
                    },
                    _ => RentCharge {
                        fixed_component: Decimal::ZERO,
                        revenue_component: share,
                        total: share,
                    },
                }
            }
            RentModel::PartnerInvestment {
                yield_rate,
                escalation,
                ..
            } => {
                let investment = self.partner_investment().unwrap_or(Decimal::ZERO);
                let first_year_rent = investment * yield_rate;
                RentCharge::fixed(escalated(
                    first_year_rent,
                    escalation,
                    contract_start_year,
                    year,
                ))
            }
            RentModel::Hybrid {
                base_rent,
                escalation,
                share_pct,
                revenue_threshold,
            } => {
                let fixed = escalated(*base_rent, escalation, contract_start_year, year);
                let excess = (revenue - revenue_threshold).max(Decimal::ZERO);
                let share = excess * share_pct;
                RentCharge {
                    fixed_component: fixed,
                    revenue_component: share,
                    total: fixed + share,
                }
            }
        }
    }

    /// Reject parameter sets that are inconsistent for the active variant.
    pub fn validate(&self, contract_start_year: i32, series_end: i32) -> LeaseProjectionResult<()> {
        match self {
            RentModel::FixedEscalation {
                base_rent,
                escalation,
            } => {
                validate_non_negative("rent.base_rent", *base_rent)?;
                validate_escalation(escalation, contract_start_year, series_end)
            }
            RentModel::RevenueShare {
                share_pct,
                minimum_guarantee,
            } => {
                validate_share("rent.share_pct", *share_pct)?;
                if let Some(g) = minimum_guarantee {
                    validate_non_negative("rent.minimum_guarantee", *g)?;
                }
                Ok(())
            }
            RentModel::PartnerInvestment {
                land_area_sqm,
                land_price_per_sqm,
                built_up_area_sqm,
                construction_cost_per_sqm,
                yield_rate,
                escalation,
            } => {
                validate_non_negative("rent.land_area_sqm", *land_area_sqm)?;
                validate_non_negative("rent.land_price_per_sqm", *land_price_per_sqm)?;
                validate_non_negative("rent.built_up_area_sqm", *built_up_area_sqm)?;
                validate_non_negative("rent.construction_cost_per_sqm", *construction_cost_per_sqm)?;
                validate_share("rent.yield_rate", *yield_rate)?;
                let investment = self.partner_investment().unwrap_or(Decimal::ZERO);
                if investment <= Decimal::ZERO {
                    return Err(LeaseProjectionError::invalid(
                        "rent.partner_investment",
                        "Land and construction inputs yield a zero partner investment",
                    ));
                }
                validate_escalation(escalation, contract_start_year, series_end)
            }
            RentModel::Hybrid {
                base_rent,
                escalation,
                share_pct,
                revenue_threshold,
            } => {
                validate_non_negative("rent.base_rent", *base_rent)?;
                validate_non_negative("rent.revenue_threshold", *revenue_threshold)?;
                validate_share("rent.share_pct", *share_pct)?;
                validate_escalation(escalation, contract_start_year, series_end)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn escalation_schedule(base: Money, escalation: &Escalation, contract_start_year: i32) -> StepSchedule {
    StepSchedule {
        base_value: base,
        growth_rate: escalation.rate,
        frequency_years: escalation.frequency_years,
        reference_year: contract_start_year,
    }
}

fn escalated(base: Money, escalation: &Escalation, contract_start_year: i32, year: i32) -> Money {
    escalation_schedule(base, escalation, contract_start_year).value_in(year)
}

fn validate_escalation(
    escalation: &Escalation,
    contract_start_year: i32,
    series_end: i32,
) -> LeaseProjectionResult<()> {
    escalation_schedule(Decimal::ZERO, escalation, contract_start_year)
        .validate("rent.escalation", series_end)
}

fn validate_share(field: &str, value: Rate) -> LeaseProjectionResult<()> {
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(LeaseProjectionError::invalid(
            field,
            format!("Rate must be in (0, 1], got {value}"),
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Money) -> LeaseProjectionResult<()> {
    if value < Decimal::ZERO {
        return Err(LeaseProjectionError::invalid(
            field,
            format!("Value must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
