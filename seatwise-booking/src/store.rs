use async_trait::async_trait;

use crate::models::Booking;
use seatwise_core::CoreResult;

/// Store contract for booking records. Lookup by user goes through a
/// secondary index keyed on `user_id`; ordering beyond index order is not
/// guaranteed.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn put_booking(&self, booking: &Booking) -> CoreResult<()>;

    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>>;

    async fn delete_booking(&self, booking_id: &str) -> CoreResult<()>;

    async fn bookings_by_user(&self, user_id: &str) -> CoreResult<Vec<Booking>>;
}
