use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::models::Booking;
use crate::store::BookingStore;
use seatwise_catalog::{EventStore, SeatAdjustment};
use seatwise_core::{CoreError, CoreResult};

/// Raw reservation payload. Ticket count defaults to 1 and `seat_numbers`
/// stays untyped here so a scalar value can be rejected with a proper
/// validation error instead of a body-rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub user_id: Option<String>,
    pub num_tickets: Option<i64>,
    pub seat_numbers: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReserveOutcome {
    pub booking: Booking,
    pub remaining_seats: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelOutcome {
    pub restored_seats: u32,
    pub updated_total_seats: i64,
}

/// The booking engine implements the atomic seat-accounting protocol.
///
/// Correctness under concurrent requests rests entirely on the store's
/// conditional adjustment: no in-process locks, no read-then-write. Two
/// overlapping reservations can never together exceed `total_seats`.
pub struct BookingEngine {
    events: Arc<dyn EventStore>,
    bookings: Arc<dyn BookingStore>,
}

struct ValidatedReserve {
    user_id: String,
    num_tickets: u32,
    seat_numbers: Vec<String>,
}

impl BookingEngine {
    pub fn new(events: Arc<dyn EventStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { events, bookings }
    }

    /// Reserve seats on an event.
    ///
    /// Validation happens before any store mutation. The decrement is a
    /// single conditional operation; when its predicate fails a follow-up
    /// read disambiguates a missing event (NotFound) from insufficient
    /// seats (Conflict with requested/available counts).
    pub async fn reserve(&self, event_id: &str, request: ReserveRequest) -> CoreResult<ReserveOutcome> {
        let validated = validate_reserve(request)?;
        let delta = -(i64::from(validated.num_tickets));

        match self.events.adjust_seats(event_id, delta).await? {
            SeatAdjustment::Applied { total_seats } => {
                let booking = Booking::new(
                    validated.user_id,
                    event_id.to_string(),
                    validated.num_tickets,
                    validated.seat_numbers,
                );

                if let Err(err) = self.bookings.put_booking(&booking).await {
                    // The seats are decremented but no booking record exists.
                    // Compensate with the inverse adjustment rather than
                    // leaving an orphaned decrement.
                    return Err(self.compensate_failed_write(event_id, &booking, err).await);
                }

                info!(
                    booking_id = %booking.booking_id,
                    event_id,
                    num_tickets = booking.num_tickets,
                    remaining = total_seats,
                    "booking created"
                );

                Ok(ReserveOutcome { booking, remaining_seats: total_seats })
            }
            SeatAdjustment::ConditionFailed => match self.events.get_event(event_id).await? {
                None => Err(CoreError::NotFound("Event".to_string())),
                Some(event) => Err(CoreError::Conflict {
                    requested: validated.num_tickets,
                    available: event.total_seats,
                }),
            },
        }
    }

    /// Cancel a booking, restoring its tickets to the owning event.
    ///
    /// The increment is conditional on the event still existing. When the
    /// event has been deleted the booking record is kept (deleting it would
    /// silently lose the seats with no trace) and NotFound is reported for
    /// the associated event.
    pub async fn cancel(&self, booking_id: &str) -> CoreResult<CancelOutcome> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Booking".to_string()))?;

        match self
            .events
            .adjust_seats(&booking.event_id, i64::from(booking.num_tickets))
            .await?
        {
            SeatAdjustment::Applied { total_seats } => {
                self.bookings.delete_booking(booking_id).await?;
                info!(
                    booking_id,
                    event_id = %booking.event_id,
                    restored = booking.num_tickets,
                    "booking cancelled"
                );
                Ok(CancelOutcome {
                    restored_seats: booking.num_tickets,
                    updated_total_seats: total_seats,
                })
            }
            SeatAdjustment::ConditionFailed => {
                warn!(booking_id, event_id = %booking.event_id, "cancel kept booking: event missing");
                Err(CoreError::NotFound("Event associated with booking".to_string()))
            }
        }
    }

    pub async fn bookings_for_user(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        if user_id.trim().is_empty() {
            return Err(CoreError::Validation("user_id is required".to_string()));
        }
        self.bookings.bookings_by_user(user_id).await
    }

    async fn compensate_failed_write(
        &self,
        event_id: &str,
        booking: &Booking,
        cause: CoreError,
    ) -> CoreError {
        match self
            .events
            .adjust_seats(event_id, i64::from(booking.num_tickets))
            .await
        {
            Ok(SeatAdjustment::Applied { .. }) => {
                warn!(
                    booking_id = %booking.booking_id,
                    event_id,
                    "booking write failed, seat decrement compensated"
                );
                CoreError::Internal(format!("failed to persist booking: {cause}"))
            }
            Ok(SeatAdjustment::ConditionFailed) | Err(_) => {
                error!(
                    booking_id = %booking.booking_id,
                    event_id,
                    num_tickets = booking.num_tickets,
                    "booking write failed and compensation failed; seats leaked"
                );
                CoreError::Internal(format!(
                    "failed to persist booking and to restore {} seats on event {event_id}: {cause}",
                    booking.num_tickets
                ))
            }
        }
    }
}

fn validate_reserve(request: ReserveRequest) -> CoreResult<ValidatedReserve> {
    let user_id = request
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("user_id is required".to_string()))?;

    let num_tickets = request.num_tickets.unwrap_or(1);
    if num_tickets <= 0 {
        return Err(CoreError::Validation(
            "num_tickets must be a positive integer".to_string(),
        ));
    }
    let num_tickets = u32::try_from(num_tickets)
        .map_err(|_| CoreError::Validation("num_tickets is out of range".to_string()))?;

    let seat_numbers = match request.seat_numbers {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Ok(s),
                other => Err(CoreError::Validation(format!(
                    "seat_numbers must be a list of strings, got element {other}"
                ))),
            })
            .collect::<CoreResult<Vec<String>>>()?,
        Some(_) => {
            return Err(CoreError::Validation("seat_numbers must be a list".to_string()));
        }
    };

    Ok(ValidatedReserve { user_id, num_tickets, seat_numbers })
}
