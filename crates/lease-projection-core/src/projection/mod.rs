pub mod engine;
pub mod metrics;
pub mod period;
pub mod simulator;
pub mod validator;

pub use engine::{run_projection, run_projection_at, CalculationEngineOutput};
pub use metrics::Metrics;
pub use period::{BalanceSheet, CashFlow, PeriodResult, ProfitAndLoss};
pub use validator::{PeriodCheck, ValidationResult};
