pub mod calculation_cache;
pub mod fingerprint;

pub use calculation_cache::{CacheStats, CalculationCache};
pub use fingerprint::Fingerprint;
