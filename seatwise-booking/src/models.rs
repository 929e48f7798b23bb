use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed seat reservation.
///
/// Bookings are immutable once created: the lifecycle is
/// nonexistent → active (successful reserve) → nonexistent (cancel), with no
/// partial or pending state. The id is generated before the atomic seat
/// decrement and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub user_id: String,
    pub event_id: String,
    pub num_tickets: u32,
    pub seat_numbers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(user_id: String, event_id: String, num_tickets: u32, seat_numbers: Vec<String>) -> Self {
        Self {
            booking_id: Uuid::new_v4().to_string(),
            user_id,
            event_id,
            num_tickets,
            seat_numbers,
            created_at: Utc::now(),
        }
    }
}
