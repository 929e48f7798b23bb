pub mod engine;
pub mod models;
pub mod store;

pub use engine::{BookingEngine, CancelOutcome, ReserveOutcome, ReserveRequest};
pub use models::Booking;
pub use store::BookingStore;
