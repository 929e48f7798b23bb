use std::sync::Arc;

use tracing::info;

use crate::event::{Event, EventDraft, EventUpdate};
use crate::store::EventStore;
use seatwise_core::{CoreError, CoreResult};

/// Admin-facing catalog operations over the event store.
pub struct CatalogService {
    store: Arc<dyn EventStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn create_event(&self, draft: EventDraft) -> CoreResult<Event> {
        let event = Event::from_draft(draft)?;
        self.store.put_event(&event).await?;
        info!(event_id = %event.event_id, seats = event.total_seats, "event created");
        Ok(event)
    }

    pub async fn get_event(&self, event_id: &str) -> CoreResult<Event> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Event".to_string()))
    }

    pub async fn list_events(&self) -> CoreResult<Vec<Event>> {
        self.store.list_events().await
    }

    /// Full overwrite of the allowed field set. The metadata rewrite never
    /// carries the seat counter; an explicit `total_seats` goes through the
    /// store's atomic overwrite so a reservation landing between the read
    /// and the write is never undone.
    pub async fn update_event(&self, event_id: &str, update: EventUpdate) -> CoreResult<Event> {
        let seats_override = update.total_seats;
        let mut event = self.get_event(event_id).await?;
        event.apply_update(update)?;
        self.store.put_event(&event).await?;

        if let Some(seats) = seats_override {
            if !self.store.set_seats(event_id, seats).await? {
                return Err(CoreError::NotFound("Event".to_string()));
            }
            info!(event_id, seats, "seat counter overwritten");
        }

        self.get_event(event_id).await
    }

    /// Deleting an event does not cascade to existing bookings; a booking
    /// whose event has vanished surfaces as NotFound at cancellation time.
    pub async fn delete_event(&self, event_id: &str) -> CoreResult<()> {
        if self.store.delete_event(event_id).await? {
            info!(event_id, "event deleted");
            Ok(())
        } else {
            Err(CoreError::NotFound("Event".to_string()))
        }
    }
}
