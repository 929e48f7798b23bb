use async_trait::async_trait;

use crate::event::Event;
use seatwise_core::CoreResult;

/// Outcome of the store's atomic conditional seat adjustment.
///
/// `ConditionFailed` deliberately does not say whether the event was absent
/// or the seats were insufficient; the store evaluates its predicate
/// atomically and callers disambiguate with a follow-up read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAdjustment {
    Applied { total_seats: i64 },
    ConditionFailed,
}

/// Store contract for event records.
///
/// `adjust_seats` is the single primitive every seat-accounting guarantee
/// rests on: it must add `delta` to `total_seats` if and only if the event
/// exists and the resulting count stays non-negative, as one indivisible
/// operation with no intermediate state visible to concurrent callers.
/// Read-modify-write implementations are a known lost-update bug class and
/// are not acceptable.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert or rewrite the event record. For an event that already exists
    /// this writes metadata only: the live seat counter is left untouched,
    /// so a rewrite from a stale snapshot cannot undo a concurrent
    /// adjustment. New events get their counter initialized from
    /// `total_seats`.
    async fn put_event(&self, event: &Event) -> CoreResult<()>;

    async fn get_event(&self, event_id: &str) -> CoreResult<Option<Event>>;

    async fn list_events(&self) -> CoreResult<Vec<Event>>;

    /// Returns true when an event was actually removed.
    async fn delete_event(&self, event_id: &str) -> CoreResult<bool>;

    async fn adjust_seats(&self, event_id: &str, delta: i64) -> CoreResult<SeatAdjustment>;

    /// Atomically overwrite the live seat counter of an existing event.
    /// Returns false when the event does not exist. This and `adjust_seats`
    /// are the only operations that may change the counter.
    async fn set_seats(&self, event_id: &str, total_seats: i64) -> CoreResult<bool>;
}
