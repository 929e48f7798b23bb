use async_trait::async_trait;

use crate::models::PaymentRecord;
use seatwise_core::CoreResult;

/// Store contract for payment records: keyed by the processor's intent id,
/// with a booking-id lookup for the refund path.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Upsert by `payment_id`.
    async fn put_payment(&self, record: &PaymentRecord) -> CoreResult<()>;

    async fn get_payment(&self, payment_id: &str) -> CoreResult<Option<PaymentRecord>>;

    async fn payment_for_booking(&self, booking_id: &str) -> CoreResult<Option<PaymentRecord>>;

    /// Returns true when a record was removed.
    async fn delete_for_booking(&self, booking_id: &str) -> CoreResult<bool>;
}
