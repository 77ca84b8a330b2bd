use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    Manual,
    AutoReinvestment,
}

/// Reporting label only. The arithmetic is straight-line either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationMethod {
    Legacy,
    Current,
}

/// An owned capital item. Immutable once purchased; depreciation state is
/// always derived from the purchase year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u32,
    pub description: String,
    pub category: String,
    pub purchase_year: i32,
    pub amount: Money,
    pub useful_life_years: u32,
    pub source: AssetSource,
}

impl Asset {
    pub fn annual_depreciation(&self) -> Money {
        if self.useful_life_years == 0 {
            return self.amount;
        }
        self.amount / Decimal::from(self.useful_life_years)
    }

    /// Full years of depreciation charged by the end of `year`.
    fn years_depreciated(&self, year: i32) -> u32 {
        if year <= self.purchase_year {
            return 0;
        }
        ((year - self.purchase_year) as u32).min(self.useful_life_years.max(1))
    }

    /// Accumulated depreciation at the end of `year`, capped at the purchase amount.
    pub fn accumulated_depreciation(&self, year: i32) -> Money {
        let n = self.years_depreciated(year);
        if n >= self.useful_life_years {
            if n == 0 {
                return Decimal::ZERO;
            }
            return self.amount;
        }
        (self.annual_depreciation() * Decimal::from(n)).min(self.amount)
    }

    /// Depreciation charged in `year`. The purchase year carries none and the
    /// last year takes whatever remains.
    pub fn depreciation_in(&self, year: i32) -> Money {
        (self.accumulated_depreciation(year) - self.accumulated_depreciation(year - 1))
            .max(Decimal::ZERO)
    }

    /// Net book value at the end of `year`; zero before the asset is owned.
    pub fn net_book_value(&self, year: i32) -> Money {
        if year < self.purchase_year {
            return Decimal::ZERO;
        }
        (self.amount - self.accumulated_depreciation(year)).max(Decimal::ZERO)
    }

    /// Last year that carries a depreciation charge.
    pub fn final_depreciation_year(&self) -> i32 {
        self.purchase_year + self.useful_life_years.max(1) as i32
    }

    pub fn depreciation_method(&self, threshold_year: i32) -> DepreciationMethod {
        if self.purchase_year < threshold_year {
            DepreciationMethod::Legacy
        } else {
            DepreciationMethod::Current
        }
    }
}
