use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::saga::{run_booking_saga, SagaDeps, SagaRequest};
use crate::status::StatusTracker;
use seatwise_core::queue::{Delivery, JobSource};
use seatwise_core::CoreResult;

/// What the worker did with one delivery. Returned by `run_once` so tests can
/// drive the loop step by step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemOutcome {
    Completed,
    Retrying,
    Abandoned,
    Poison,
    Duplicate,
    Idle,
}

/// Pause between iterations after a queue-level error.
pub const SOURCE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Single consumer of the booking queue. Pulls one message at a time, drives
/// the saga and reports progress to the status tracker. Pulling one at a time
/// is what preserves FCFS ordering within a group.
pub struct Worker {
    source: Arc<dyn JobSource>,
    deps: SagaDeps,
    tracker: StatusTracker,
    max_attempts: u32,
    attempts: Mutex<HashMap<String, u32>>,
}

impl Worker {
    pub fn new(
        source: Arc<dyn JobSource>,
        deps: SagaDeps,
        tracker: StatusTracker,
        max_attempts: u32,
    ) -> Self {
        Self {
            source,
            deps,
            tracker,
            max_attempts: max_attempts.max(1),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Consume until the source closes. Queue-level errors are logged and the
    /// loop keeps going after a pause; a dead worker is worse than a noisy
    /// one, and an unreachable broker must not turn the loop into a hot spin.
    pub async fn run(&self) {
        info!("booking worker started");
        loop {
            match self.run_once().await {
                Ok(WorkItemOutcome::Idle) => {
                    info!("job source closed, worker stopping");
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    error!("worker iteration failed: {err}");
                    tokio::time::sleep(SOURCE_ERROR_BACKOFF).await;
                }
            }
        }
    }

    /// Process at most one delivery.
    pub async fn run_once(&self) -> CoreResult<WorkItemOutcome> {
        let Some(delivery) = self.source.next().await? else {
            return Ok(WorkItemOutcome::Idle);
        };

        let request: SagaRequest = match serde_json::from_str(&delivery.payload) {
            Ok(request) => request,
            Err(err) => {
                // Malformed payloads can never succeed; drop them instead of
                // letting them wedge the front of the queue.
                warn!("dropping malformed queue message: {err}");
                self.source.ack(&delivery).await?;
                return Ok(WorkItemOutcome::Poison);
            }
        };

        if self.tracker.is_completed(&request.request_id).await? {
            info!(request_id = %request.request_id, "skipping duplicate delivery");
            self.source.ack(&delivery).await?;
            return Ok(WorkItemOutcome::Duplicate);
        }

        self.tracker.mark_processing(&request.request_id).await?;

        match run_booking_saga(&self.deps, &request).await {
            Ok(outcome) => {
                let mut data = json!({
                    "booking": outcome.booking,
                    "payment": outcome.payment,
                });
                if !outcome.warnings.is_empty() {
                    data["warnings"] = json!(outcome.warnings);
                }
                self.tracker.mark_completed(&request.request_id, data).await?;
                self.attempts.lock().await.remove(&request.request_id);
                self.source.ack(&delivery).await?;
                Ok(WorkItemOutcome::Completed)
            }
            Err(err) => {
                let message = format!("{}: {err}", err.code());
                self.tracker.mark_failed(&request.request_id, &message).await?;
                self.fail_delivery(&request.request_id, &delivery, &message).await
            }
        }
    }

    /// Nack for redelivery until the attempt budget is spent, then ack and
    /// leave the failed status record as the final word.
    async fn fail_delivery(
        &self,
        request_id: &str,
        delivery: &Delivery,
        message: &str,
    ) -> CoreResult<WorkItemOutcome> {
        let mut attempts = self.attempts.lock().await;
        let count = attempts.entry(request_id.to_string()).or_insert(0);
        *count += 1;

        if *count >= self.max_attempts {
            attempts.remove(request_id);
            drop(attempts);
            error!(request_id, attempts = self.max_attempts, "giving up on request: {message}");
            self.source.ack(delivery).await?;
            Ok(WorkItemOutcome::Abandoned)
        } else {
            let attempt = *count;
            drop(attempts);
            warn!(request_id, attempt, "saga failed, leaving message for retry: {message}");
            self.source.nack(delivery).await?;
            Ok(WorkItemOutcome::Retrying)
        }
    }
}
