pub mod model;

pub use model::{Escalation, RentCharge, RentModel};
