use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use seatwise_booking::models::Booking;
use seatwise_booking::store::BookingStore;
use seatwise_catalog::event::Event;
use seatwise_catalog::store::{EventStore, SeatAdjustment};
use seatwise_core::queue::{Delivery, JobSource, QueueMessage, WorkQueue};
use seatwise_core::CoreResult;
use seatwise_orch::status::{StatusRecord, StatusStore};
use seatwise_payment::models::PaymentRecord;
use seatwise_payment::store::PaymentStore;

/// In-memory backend implementing every store contract. Used by tests and by
/// local single-process runs; the seat adjustment holds the event map's write
/// lock for the whole check-and-update, which gives the same atomicity the
/// Redis script provides in production.
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<String, Event>>,
    bookings: RwLock<HashMap<String, Booking>>,
    payments: RwLock<HashMap<String, PaymentRecord>>,
    statuses: RwLock<HashMap<String, StatusRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn put_event(&self, event: &Event) -> CoreResult<()> {
        let mut events = self.events.write().await;
        let mut record = event.clone();
        // Rewrites carry a counter snapshot that may be stale; the live
        // counter only moves through adjust_seats and set_seats.
        if let Some(existing) = events.get(&event.event_id) {
            record.total_seats = existing.total_seats;
        }
        events.insert(event.event_id.clone(), record);
        Ok(())
    }

    async fn get_event(&self, event_id: &str) -> CoreResult<Option<Event>> {
        Ok(self.events.read().await.get(event_id).cloned())
    }

    async fn list_events(&self) -> CoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self.events.read().await.values().cloned().collect();
        events.sort_by(|a, b| a.event_id.cmp(&b.event_id));
        Ok(events)
    }

    async fn delete_event(&self, event_id: &str) -> CoreResult<bool> {
        Ok(self.events.write().await.remove(event_id).is_some())
    }

    async fn adjust_seats(&self, event_id: &str, delta: i64) -> CoreResult<SeatAdjustment> {
        let mut events = self.events.write().await;
        let Some(event) = events.get_mut(event_id) else {
            return Ok(SeatAdjustment::ConditionFailed);
        };
        let next = event.total_seats + delta;
        if next < 0 {
            return Ok(SeatAdjustment::ConditionFailed);
        }
        event.total_seats = next;
        Ok(SeatAdjustment::Applied { total_seats: next })
    }

    async fn set_seats(&self, event_id: &str, total_seats: i64) -> CoreResult<bool> {
        let mut events = self.events.write().await;
        match events.get_mut(event_id) {
            Some(event) => {
                event.total_seats = total_seats;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn put_booking(&self, booking: &Booking) -> CoreResult<()> {
        self.bookings
            .write()
            .await
            .insert(booking.booking_id.clone(), booking.clone());
        Ok(())
    }

    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(booking_id).cloned())
    }

    async fn delete_booking(&self, booking_id: &str) -> CoreResult<()> {
        self.bookings.write().await.remove(booking_id);
        Ok(())
    }

    async fn bookings_by_user(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(bookings)
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn put_payment(&self, record: &PaymentRecord) -> CoreResult<()> {
        self.payments
            .write()
            .await
            .insert(record.payment_id.clone(), record.clone());
        Ok(())
    }

    async fn get_payment(&self, payment_id: &str) -> CoreResult<Option<PaymentRecord>> {
        Ok(self.payments.read().await.get(payment_id).cloned())
    }

    async fn payment_for_booking(&self, booking_id: &str) -> CoreResult<Option<PaymentRecord>> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|record| record.booking_id == booking_id)
            .cloned())
    }

    async fn delete_for_booking(&self, booking_id: &str) -> CoreResult<bool> {
        let mut payments = self.payments.write().await;
        let ids: Vec<String> = payments
            .values()
            .filter(|record| record.booking_id == booking_id)
            .map(|record| record.payment_id.clone())
            .collect();
        for id in &ids {
            payments.remove(id);
        }
        Ok(!ids.is_empty())
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn put_status(&self, record: &StatusRecord) -> CoreResult<()> {
        self.statuses
            .write()
            .await
            .insert(record.request_id.clone(), record.clone());
        Ok(())
    }

    async fn get_status(&self, request_id: &str) -> CoreResult<Option<StatusRecord>> {
        Ok(self.statuses.read().await.get(request_id).cloned())
    }
}

struct InFlight {
    receipt: String,
    message: QueueMessage,
}

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<QueueMessage>,
    in_flight: Vec<InFlight>,
}

/// In-memory FIFO queue implementing both sides of the work-queue contract.
/// A nacked message returns to the head of the queue so per-group ordering
/// survives retries. `next` returns `None` when the queue is drained, which
/// lets tests run the worker loop to completion.
#[derive(Default)]
pub struct MemoryQueue {
    inner: Mutex<QueueInner>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages waiting for delivery (in-flight excluded).
    pub async fn len(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn enqueue(&self, message: QueueMessage) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        // Deduplicate against messages not yet settled, the way a FIFO queue
        // with content dedup drops rapid double submits.
        let duplicate = inner
            .pending
            .iter()
            .any(|m| m.dedup_id == message.dedup_id)
            || inner.in_flight.iter().any(|f| f.message.dedup_id == message.dedup_id);
        if !duplicate {
            inner.pending.push_back(message);
        }
        Ok(())
    }
}

#[async_trait]
impl JobSource for MemoryQueue {
    async fn next(&self) -> CoreResult<Option<Delivery>> {
        let mut inner = self.inner.lock().await;
        let Some(message) = inner.pending.pop_front() else {
            return Ok(None);
        };
        let receipt = Uuid::new_v4().to_string();
        let delivery = Delivery {
            payload: message.payload.clone(),
            receipt: receipt.clone(),
        };
        inner.in_flight.push(InFlight { receipt, message });
        Ok(Some(delivery))
    }

    async fn ack(&self, delivery: &Delivery) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.in_flight.retain(|f| f.receipt != delivery.receipt);
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(pos) = inner
            .in_flight
            .iter()
            .position(|f| f.receipt == delivery.receipt)
        {
            let item = inner.in_flight.remove(pos);
            inner.pending.push_front(item.message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(event_id: &str, seats: i64) -> Event {
        Event {
            event_id: event_id.to_string(),
            title: "Concert".to_string(),
            description: None,
            venue: "Stadium".to_string(),
            date: Utc::now(),
            total_seats: seats,
            price: 50.0,
            event_image: None,
            venue_image: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn adjust_seats_enforces_floor_and_existence() {
        let store = MemoryStore::new();
        store.put_event(&event("ev-1", 2)).await.unwrap();

        assert_eq!(
            store.adjust_seats("ev-1", -2).await.unwrap(),
            SeatAdjustment::Applied { total_seats: 0 }
        );
        assert_eq!(
            store.adjust_seats("ev-1", -1).await.unwrap(),
            SeatAdjustment::ConditionFailed
        );
        assert_eq!(
            store.adjust_seats("missing", -1).await.unwrap(),
            SeatAdjustment::ConditionFailed
        );
        assert_eq!(
            store.adjust_seats("ev-1", 5).await.unwrap(),
            SeatAdjustment::Applied { total_seats: 5 }
        );
    }

    #[tokio::test]
    async fn rewriting_an_event_preserves_the_live_seat_counter() {
        let store = MemoryStore::new();
        store.put_event(&event("ev-1", 5)).await.unwrap();
        let snapshot = store.get_event("ev-1").await.unwrap().unwrap();

        // Two seats are sold after the snapshot was read.
        store.adjust_seats("ev-1", -2).await.unwrap();

        // Rewriting the record from the stale snapshot must not resurrect
        // the sold seats.
        store.put_event(&snapshot).await.unwrap();
        let current = store.get_event("ev-1").await.unwrap().unwrap();
        assert_eq!(current.total_seats, 3);
    }

    #[tokio::test]
    async fn set_seats_overwrites_existing_counters_only() {
        let store = MemoryStore::new();
        store.put_event(&event("ev-1", 5)).await.unwrap();

        assert!(store.set_seats("ev-1", 12).await.unwrap());
        let current = store.get_event("ev-1").await.unwrap().unwrap();
        assert_eq!(current.total_seats, 12);

        assert!(!store.set_seats("missing", 12).await.unwrap());
    }

    #[tokio::test]
    async fn queue_preserves_order_and_requeues_nacks_at_head() {
        let queue = MemoryQueue::new();
        for id in ["a", "b", "c"] {
            queue
                .enqueue(QueueMessage {
                    group_key: "g".to_string(),
                    dedup_id: id.to_string(),
                    payload: id.to_string(),
                })
                .await
                .unwrap();
        }

        let first = queue.next().await.unwrap().unwrap();
        assert_eq!(first.payload, "a");
        queue.nack(&first).await.unwrap();

        // The nacked message comes back before "b".
        let again = queue.next().await.unwrap().unwrap();
        assert_eq!(again.payload, "a");
        queue.ack(&again).await.unwrap();

        assert_eq!(queue.next().await.unwrap().unwrap().payload, "b");
        assert_eq!(queue.next().await.unwrap().unwrap().payload, "c");
    }

    #[tokio::test]
    async fn queue_drops_unsettled_duplicates() {
        let queue = MemoryQueue::new();
        let message = QueueMessage {
            group_key: "g".to_string(),
            dedup_id: "same".to_string(),
            payload: "x".to_string(),
        };
        queue.enqueue(message.clone()).await.unwrap();
        queue.enqueue(message.clone()).await.unwrap();
        assert_eq!(queue.len().await, 1);

        // Once settled, the same dedup id may be submitted again.
        let delivery = queue.next().await.unwrap().unwrap();
        queue.ack(&delivery).await.unwrap();
        queue.enqueue(message).await.unwrap();
        assert_eq!(queue.len().await, 1);
    }
}
