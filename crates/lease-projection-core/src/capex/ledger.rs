use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assumptions::{CapexConfig, Timeline};
use crate::capex::asset::{Asset, AssetSource, DepreciationMethod};
use crate::capex::reinvestment::ReinvestmentTrigger;
use crate::error::LeaseProjectionError;
use crate::types::Money;
use crate::LeaseProjectionResult;

/// The ledger's contribution to one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPeriod {
    pub capex: Money,
    pub depreciation: Money,
    pub net_book_value: Money,
}

/// Reporting row for one asset at the end of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetScheduleRow {
    pub id: u32,
    pub description: String,
    pub category: String,
    pub purchase_year: i32,
    pub amount: Money,
    pub useful_life_years: u32,
    pub source: AssetSource,
    pub depreciation_method: DepreciationMethod,
    pub annual_depreciation: Money,
    pub accumulated_depreciation: Money,
    pub net_book_value: Money,
}

/// Every capital asset of one projection run, manual and auto-reinvested.
#[derive(Debug, Clone)]
pub struct AssetLedger {
    assets: Vec<Asset>,
    replaced: HashSet<u32>,
    timeline: Timeline,
    next_id: u32,
    /// Revenue of the first contract year, the base for revenue-sized purchases
    reference_revenue: Option<Money>,
}

impl AssetLedger {
    pub fn new(timeline: Timeline) -> Self {
        AssetLedger {
            assets: Vec::new(),
            replaced: HashSet::new(),
            timeline,
            next_id: 1,
            reference_revenue: None,
        }
    }

    /// Seed the ledger with the manually entered assets.
    pub fn from_config(config: &CapexConfig, timeline: Timeline) -> LeaseProjectionResult<Self> {
        let mut ledger = AssetLedger::new(timeline);
        for manual in &config.manual_assets {
            let category = config
                .category(&manual.category)
                .ok_or_else(|| LeaseProjectionError::UnknownCategory(manual.category.clone()))?;
            if manual.purchase_year < timeline.first_year
                || manual.purchase_year > timeline.series_end()
            {
                return Err(LeaseProjectionError::invalid(
                    "capex.manual_assets.purchase_year",
                    format!(
                        "Purchase year {} outside the projection {}-{}",
                        manual.purchase_year,
                        timeline.first_year,
                        timeline.series_end()
                    ),
                ));
            }
            ledger.purchase(
                manual.description.clone(),
                &category.name,
                manual.purchase_year,
                manual.amount,
                category.useful_life_years,
                AssetSource::Manual,
            );
        }
        Ok(ledger)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn purchase(
        &mut self,
        description: String,
        category: &str,
        purchase_year: i32,
        amount: Money,
        useful_life_years: u32,
        source: AssetSource,
    ) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.assets.push(Asset {
            id,
            description,
            category: category.to_string(),
            purchase_year,
            amount,
            useful_life_years,
            source,
        });
        id
    }

    /// Run the auto-reinvestment policies for a contract year. Returns the
    /// total amount purchased. The first call of the contract phase fixes the
    /// reference revenue for revenue-sized purchases.
    pub fn reinvest(&mut self, config: &CapexConfig, year: i32, revenue: Money) -> Money {
        let offset = match self.timeline.contract_offset(year) {
            Some(o) => o,
            None => return Decimal::ZERO,
        };
        let reference_revenue = *self.reference_revenue.get_or_insert(revenue);
        if !config.auto_reinvestment {
            return Decimal::ZERO;
        }

        let mut purchased = Decimal::ZERO;
        for category in &config.categories {
            let policy = match config.policy_for(category) {
                Some(p) => p,
                None => continue,
            };

            // (reference cost, id being replaced)
            let mut orders: Vec<(Option<Money>, Option<u32>)> = Vec::new();
            match policy.trigger {
                ReinvestmentTrigger::EveryYears { .. } => {
                    if policy.trigger.fires_at_offset(offset) {
                        orders.push((self.latest_cost(&category.name, year), None));
                    }
                }
                ReinvestmentTrigger::OnFullDepreciation => {
                    for asset in self.assets.iter().filter(|a| {
                        a.category == category.name
                            && a.final_depreciation_year() < year
                            && !self.replaced.contains(&a.id)
                    }) {
                        orders.push((Some(asset.amount), Some(asset.id)));
                    }
                }
            }

            for (prior_cost, replaces) in orders {
                if let Some(id) = replaces {
                    self.replaced.insert(id);
                }
                let amount = policy.sizing.amount(prior_cost, reference_revenue);
                if amount <= Decimal::ZERO {
                    continue;
                }
                let id = self.purchase(
                    format!("Auto-reinvestment {} {}", category.name, year),
                    &category.name,
                    year,
                    amount,
                    category.useful_life_years,
                    AssetSource::AutoReinvestment,
                );
                debug!(year, category = %category.name, %amount, id, "auto-reinvestment purchase");
                purchased += amount;
            }
        }
        purchased
    }

    /// Cost of the most recent asset in a category purchased before `year`.
    fn latest_cost(&self, category: &str, year: i32) -> Option<Money> {
        self.assets
            .iter()
            .filter(|a| a.category == category && a.purchase_year < year)
            .max_by_key(|a| (a.purchase_year, a.id))
            .map(|a| a.amount)
    }

    pub fn capex_in(&self, year: i32) -> Money {
        self.assets
            .iter()
            .filter(|a| a.purchase_year == year)
            .map(|a| a.amount)
            .sum()
    }

    pub fn depreciation_in(&self, year: i32) -> Money {
        self.assets.iter().map(|a| a.depreciation_in(year)).sum()
    }

    pub fn net_book_value(&self, year: i32) -> Money {
        self.assets.iter().map(|a| a.net_book_value(year)).sum()
    }

    pub fn period(&self, year: i32) -> LedgerPeriod {
        LedgerPeriod {
            capex: self.capex_in(year),
            depreciation: self.depreciation_in(year),
            net_book_value: self.net_book_value(year),
        }
    }

    /// Per-asset report as of `year`.
    pub fn schedule(&self, year: i32) -> Vec<AssetScheduleRow> {
        let threshold = self.timeline.contract_start_year;
        self.assets
            .iter()
            .map(|a| AssetScheduleRow {
                id: a.id,
                description: a.description.clone(),
                category: a.category.clone(),
                purchase_year: a.purchase_year,
                amount: a.amount,
                useful_life_years: a.useful_life_years,
                source: a.source,
                depreciation_method: a.depreciation_method(threshold),
                annual_depreciation: a.annual_depreciation(),
                accumulated_depreciation: a.accumulated_depreciation(year),
                net_book_value: a.net_book_value(year),
            })
            .collect()
    }
}
