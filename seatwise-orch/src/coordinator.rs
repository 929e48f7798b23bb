use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::saga::SagaRequest;
use crate::status::StatusTracker;
use seatwise_core::queue::{QueueMessage, WorkQueue};
use seatwise_core::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize)]
pub struct EnqueuedRequest {
    pub request_id: String,
    pub status: &'static str,
}

/// Accepts async booking requests: assigns a request id, records the queued
/// status and publishes the saga payload keyed by event so requests for the
/// same event are processed in arrival order.
#[derive(Clone)]
pub struct Coordinator {
    queue: Arc<dyn WorkQueue>,
    tracker: StatusTracker,
}

impl Coordinator {
    pub fn new(queue: Arc<dyn WorkQueue>, tracker: StatusTracker) -> Self {
        Self { queue, tracker }
    }

    pub async fn enqueue(&self, mut request: SagaRequest) -> CoreResult<EnqueuedRequest> {
        if request.event_id.trim().is_empty() {
            return Err(CoreError::Validation("event_id is required".to_string()));
        }
        if request.user_id.trim().is_empty() {
            return Err(CoreError::Validation("user_id is required".to_string()));
        }
        if request.num_tickets <= 0 {
            return Err(CoreError::Validation(
                "num_tickets must be a positive integer".to_string(),
            ));
        }

        if request.request_id.trim().is_empty() {
            request.request_id = Uuid::new_v4().to_string();
        }

        let payload = serde_json::to_string(&request)
            .map_err(|err| CoreError::Internal(format!("failed to encode saga request: {err}")))?;

        self.queue
            .enqueue(QueueMessage {
                group_key: request.event_id.clone(),
                dedup_id: request.request_id.clone(),
                payload,
            })
            .await?;

        // Recorded after the publish succeeds so a failed publish never
        // leaves a queued record with no message behind it.
        self.tracker.mark_queued(&request.request_id).await?;

        info!(
            request_id = %request.request_id,
            event_id = %request.event_id,
            "booking request queued"
        );

        Ok(EnqueuedRequest {
            request_id: request.request_id,
            status: "queued",
        })
    }
}
