pub mod clients;
pub mod coordinator;
pub mod saga;
pub mod status;
pub mod worker;

pub use clients::{HttpBookingClient, HttpNotifier, HttpPaymentClient};
pub use coordinator::{Coordinator, EnqueuedRequest};
pub use saga::{
    BookingClient, LogNotifier, Notifier, PaymentClient, SagaDeps, SagaError, SagaOutcome,
    SagaRequest,
};
pub use status::{RequestState, StatusRecord, StatusStore, StatusTracker};
pub use worker::{WorkItemOutcome, Worker};
