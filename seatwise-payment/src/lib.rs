pub mod mock;
pub mod models;
pub mod service;
pub mod store;

pub use mock::MockProcessor;
pub use models::{PaymentRecord, PaymentStatus};
pub use service::{
    CreateIntentOutcome, CreateIntentRequest, IntentStatus, PaymentService, RefundOutcome,
};
pub use store::PaymentStore;
