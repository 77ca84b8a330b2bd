//! Services around the engine: persistence of the latest output, the
//! offer/counter-offer chain of a negotiation, and the cached entry point
//! that ties them together. None of them carries projection logic.

pub mod negotiation;
pub mod service;
pub mod store;

pub use negotiation::{Negotiation, Offer, OfferOrigin};
pub use service::ProjectionService;
pub use store::{InMemoryProjectionStore, ProjectionStore, StoredProjection};
