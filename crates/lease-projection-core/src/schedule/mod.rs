pub mod ramp;
pub mod resolver;
pub mod step;

pub use ramp::RampUp;
pub use resolver::{resolve_contract_year, resolve_transition_year, YearlyDrivers};
pub use step::{compound, StepSchedule};
