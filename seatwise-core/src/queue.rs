use async_trait::async_trait;

use crate::CoreResult;

/// A message bound for the durable booking work queue.
///
/// `group_key` partitions ordering: all messages sharing a key are delivered
/// strictly in submission order (FCFS per event), while different keys may be
/// processed concurrently. `dedup_id` lets the backend drop at-least-once
/// redeliveries of the same submission.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub group_key: String,
    pub dedup_id: String,
    pub payload: String,
}

/// One received message plus the opaque receipt needed to ack or nack it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub payload: String,
    pub receipt: String,
}

#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn enqueue(&self, message: QueueMessage) -> CoreResult<()>;
}

/// Consumer side of the work queue. Implementations pull a single message at
/// a time so the worker preserves strict per-group ordering.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Wait for the next message. Returns `None` when the source is closed.
    async fn next(&self) -> CoreResult<Option<Delivery>>;

    /// Acknowledge successful (or poison) processing; the message is gone.
    async fn ack(&self, delivery: &Delivery) -> CoreResult<()>;

    /// Reject processing; the message becomes visible again for retry.
    async fn nack(&self, delivery: &Delivery) -> CoreResult<()>;
}
