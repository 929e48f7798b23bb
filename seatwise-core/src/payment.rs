use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Intent status as reported by the external processor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorStatus {
    RequiresPaymentMethod,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
}

impl ProcessorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorStatus::RequiresPaymentMethod => "requires_payment_method",
            ProcessorStatus::RequiresAction => "requires_action",
            ProcessorStatus::Processing => "processing",
            ProcessorStatus::Succeeded => "succeeded",
            ProcessorStatus::Canceled => "canceled",
        }
    }
}

/// A payment intent as the external processor sees it.
///
/// Amounts are the processor's minor-unit integers (e.g. cents). Conversion
/// from major units happens exactly once, in the payment service boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorIntent {
    pub id: String,
    pub booking_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: ProcessorStatus,
    pub client_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorRefund {
    pub id: String,
    pub status: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Processor faults are kept distinct from internal store/transport faults
/// so the API can surface them as client-visible payment errors.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("processor rejected the request: {0}")]
    Rejected(String),

    #[error("payment intent not found: {0}")]
    NotFound(String),

    #[error("transport failure reaching processor: {0}")]
    Transport(String),
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a payment intent with the provider.
    async fn create_intent(
        &self,
        booking_id: &str,
        amount_minor: i64,
        currency: &str,
    ) -> Result<ProcessorIntent, ProcessorError>;

    /// Re-fetch the current state of an intent.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<ProcessorIntent, ProcessorError>;

    /// Refund an intent, fully (`None`) or partially (minor units).
    async fn refund(
        &self,
        intent_id: &str,
        amount_minor: Option<i64>,
    ) -> Result<ProcessorRefund, ProcessorError>;
}
