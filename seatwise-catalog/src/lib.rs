pub mod event;
pub mod service;
pub mod store;

pub use event::{Event, EventDraft, EventUpdate};
pub use service::CatalogService;
pub use store::{EventStore, SeatAdjustment};
