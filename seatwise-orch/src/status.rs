use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use seatwise_core::{CoreError, CoreResult};

/// Lifecycle of an async booking request. States only move forward, with one
/// exception: a failed request that is redelivered moves back to processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Queued => "queued",
            RequestState::Processing => "processing",
            RequestState::Completed => "completed",
            RequestState::Failed => "failed",
        }
    }

    /// Completed is terminal; failed may return to processing on redelivery.
    fn can_move_to(&self, next: RequestState) -> bool {
        match (self, next) {
            (RequestState::Completed, _) => false,
            (RequestState::Failed, RequestState::Processing) => true,
            (RequestState::Failed, RequestState::Failed) => true,
            (RequestState::Queued, RequestState::Queued) => false,
            (RequestState::Queued, _) => true,
            (RequestState::Processing, RequestState::Queued) => false,
            (RequestState::Processing, _) => true,
            (RequestState::Failed, _) => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub request_id: String,
    pub status: RequestState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn put_status(&self, record: &StatusRecord) -> CoreResult<()>;

    async fn get_status(&self, request_id: &str) -> CoreResult<Option<StatusRecord>>;
}

/// Tracks async request progress through the status store, enforcing the
/// forward-only transition rules.
#[derive(Clone)]
pub struct StatusTracker {
    store: Arc<dyn StatusStore>,
}

impl StatusTracker {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    pub async fn mark_queued(&self, request_id: &str) -> CoreResult<()> {
        self.transition(request_id, RequestState::Queued, None, None).await
    }

    pub async fn mark_processing(&self, request_id: &str) -> CoreResult<()> {
        self.transition(request_id, RequestState::Processing, None, None).await
    }

    pub async fn mark_completed(&self, request_id: &str, data: Value) -> CoreResult<()> {
        self.transition(request_id, RequestState::Completed, Some(data), None).await
    }

    pub async fn mark_failed(&self, request_id: &str, error: &str) -> CoreResult<()> {
        self.transition(request_id, RequestState::Failed, None, Some(error.to_string()))
            .await
    }

    pub async fn get(&self, request_id: &str) -> CoreResult<StatusRecord> {
        self.store
            .get_status(request_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Request".to_string()))
    }

    /// Whether the request already finished successfully. Used by the worker
    /// to drop duplicate deliveries of the same request id.
    pub async fn is_completed(&self, request_id: &str) -> CoreResult<bool> {
        Ok(self
            .store
            .get_status(request_id)
            .await?
            .is_some_and(|record| record.status == RequestState::Completed))
    }

    async fn transition(
        &self,
        request_id: &str,
        next: RequestState,
        data: Option<Value>,
        error: Option<String>,
    ) -> CoreResult<()> {
        if let Some(current) = self.store.get_status(request_id).await? {
            if !current.status.can_move_to(next) {
                warn!(
                    request_id,
                    from = current.status.as_str(),
                    to = next.as_str(),
                    "ignoring backwards status transition"
                );
                return Ok(());
            }
        }

        let record = StatusRecord {
            request_id: request_id.to_string(),
            status: next,
            data,
            error,
            updated_at: Utc::now(),
        };
        self.store.put_status(&record).await
    }
}
