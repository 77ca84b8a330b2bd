pub mod asset;
pub mod ledger;
pub mod reinvestment;

pub use asset::{Asset, AssetSource, DepreciationMethod};
pub use ledger::{AssetLedger, AssetScheduleRow, LedgerPeriod};
pub use reinvestment::{ReinvestmentPolicy, ReinvestmentSizing, ReinvestmentTrigger};
