use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::capex::reinvestment::ReinvestmentPolicy;
use crate::rent::model::RentModel;
use crate::schedule::ramp::RampUp;
use crate::schedule::step::StepSchedule;
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const HISTORICAL_YEARS: usize = 2;
pub const TRANSITION_YEARS: usize = 3;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Immutable snapshot of every assumption behind one projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// Display name of the proposal (offer) being evaluated
    pub proposal_name: String,
    pub timeline: Timeline,
    /// Balances at the start of the first historical year
    #[serde(default)]
    pub opening_position: OpeningPosition,
    /// Recorded figures for the historical years
    pub historical: Vec<HistoricalYear>,
    pub transition: TransitionConfig,
    pub curricula: Vec<CurriculumStream>,
    pub staffing: StaffingPlan,
    pub rent: RentModel,
    /// Other operating expenses as % of revenue
    pub other_opex_pct: Rate,
    pub rates: SystemRates,
    #[serde(default)]
    pub capex: CapexConfig,
}

/// Year layout: historical years, then transition years, then the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// First historical year
    pub first_year: i32,
    /// First contract year (year after the last transition year)
    pub contract_start_year: i32,
    /// Number of contract years, including the start year
    pub contract_length_years: u32,
}

/// Which data source drives a projected year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Historical,
    Transition,
    Contract,
}

impl Timeline {
    pub fn series_end(&self) -> i32 {
        self.contract_start_year + self.contract_length_years as i32 - 1
    }

    pub fn transition_start(&self) -> i32 {
        self.first_year + HISTORICAL_YEARS as i32
    }

    /// Every projected year, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.first_year..=self.series_end()
    }

    pub fn phase_of(&self, year: i32) -> Phase {
        if year < self.transition_start() {
            Phase::Historical
        } else if year < self.contract_start_year {
            Phase::Transition
        } else {
            Phase::Contract
        }
    }

    /// Full years elapsed since the contract start, `None` before it.
    pub fn contract_offset(&self, year: i32) -> Option<u32> {
        if year >= self.contract_start_year {
            Some((year - self.contract_start_year) as u32)
        } else {
            None
        }
    }

    pub fn total_years(&self) -> usize {
        (self.series_end() - self.first_year + 1).max(0) as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningPosition {
    pub cash: Money,
    pub debt: Money,
}

/// Recorded actuals for one historical year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalYear {
    pub year: i32,
    pub enrollment: Decimal,
    pub revenue: Money,
    pub staff_costs: Money,
    pub other_opex: Money,
    pub rent: Money,
}

/// Bridge years between the historical actuals and the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub years: Vec<TransitionYear>,
    /// Rent in the first transition year
    pub base_rent: Money,
    /// Annual compounding growth of the transition rent
    pub rent_growth_rate: Rate,
    /// When the transition-wide configuration was last edited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionYear {
    pub year: i32,
    pub enrollment: Decimal,
    pub average_tuition: Money,
}

/// One curriculum offered on the campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumStream {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum number of students the stream can seat
    pub capacity: Decimal,
    pub ramp_up: RampUp,
    pub tuition: StepSchedule,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingPlan {
    pub roles: Vec<StaffRole>,
    /// Year the base salaries are quoted in
    pub salary_reference_year: i32,
    pub cpi_rate: Rate,
    /// Years between CPI salary adjustments
    pub cpi_frequency_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRole {
    pub name: String,
    pub students_per_staff: Decimal,
    #[serde(default)]
    pub minimum_headcount: u32,
    /// Annual salary at the salary reference year
    pub base_salary: Money,
}

impl StaffingPlan {
    pub fn salary_schedule(&self, role: &StaffRole) -> StepSchedule {
        StepSchedule {
            base_value: role.base_salary,
            growth_rate: self.cpi_rate,
            frequency_years: self.cpi_frequency_years,
            reference_year: self.salary_reference_year,
        }
    }
}

/// Macro and covenant rates applied to every year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRates {
    pub zakat_rate: Rate,
    pub debt_interest_rate: Rate,
    pub deposit_interest_rate: Rate,
    pub discount_rate: Rate,
    pub minimum_cash_balance: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapexConfig {
    #[serde(default)]
    pub auto_reinvestment: bool,
    #[serde(default)]
    pub default_policy: Option<ReinvestmentPolicy>,
    #[serde(default)]
    pub categories: Vec<AssetCategory>,
    #[serde(default)]
    pub manual_assets: Vec<ManualAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCategory {
    pub name: String,
    pub useful_life_years: u32,
    /// Overrides the default reinvestment policy for this category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ReinvestmentPolicy>,
}

/// A one-off purchase entered by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAsset {
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub purchase_year: i32,
    pub amount: Money,
}

impl CapexConfig {
    pub fn category(&self, name: &str) -> Option<&AssetCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Effective policy for a category: its override, else the default.
    pub fn policy_for<'a>(&'a self, category: &'a AssetCategory) -> Option<&'a ReinvestmentPolicy> {
        category.policy.as_ref().or(self.default_policy.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline {
            first_year: 2023,
            contract_start_year: 2028,
            contract_length_years: 30,
        }
    }

    #[test]
    fn test_series_end() {
        assert_eq!(timeline().series_end(), 2057);
        assert_eq!(timeline().total_years(), 35);
    }

    #[test]
    fn test_phase_boundaries() {
        let t = timeline();
        assert_eq!(t.phase_of(2023), Phase::Historical);
        assert_eq!(t.phase_of(2024), Phase::Historical);
        assert_eq!(t.phase_of(2025), Phase::Transition);
        assert_eq!(t.phase_of(2027), Phase::Transition);
        assert_eq!(t.phase_of(2028), Phase::Contract);
        assert_eq!(t.phase_of(2057), Phase::Contract);
    }

    #[test]
    fn test_contract_offset() {
        let t = timeline();
        assert_eq!(t.contract_offset(2027), None);
        assert_eq!(t.contract_offset(2028), Some(0));
        assert_eq!(t.contract_offset(2030), Some(2));
    }
}
