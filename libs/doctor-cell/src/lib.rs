pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::Doctor;
pub use services::availability::{AvailabilityService, SLOT_CATALOG};
