use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{PaymentRecord, PaymentStatus};
use crate::store::PaymentStore;
use seatwise_core::payment::{PaymentProcessor, ProcessorError, ProcessorStatus};
use seatwise_core::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequest {
    pub booking_id: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIntentOutcome {
    pub payment_id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundOutcome {
    pub refund_id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntentStatus {
    pub payment_id: String,
    pub booking_id: String,
    pub status: String,
}

/// Payment gateway adapter: drives the external processor and keeps the
/// local audit record in sync with it.
pub struct PaymentService {
    processor: Arc<dyn PaymentProcessor>,
    store: Arc<dyn PaymentStore>,
}

/// The only place major-unit amounts become minor-unit integers.
fn to_minor_units(amount: f64) -> CoreResult<i64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation(
            "amount must be a positive number of major units, e.g. 25.00".to_string(),
        ));
    }
    let minor = (amount * 100.0).round();
    if minor > i64::MAX as f64 {
        return Err(CoreError::Validation("amount is out of range".to_string()));
    }
    Ok(minor as i64)
}

impl PaymentService {
    pub fn new(processor: Arc<dyn PaymentProcessor>, store: Arc<dyn PaymentStore>) -> Self {
        Self { processor, store }
    }

    /// Create an intent with the processor and persist the record
    /// immediately, whatever status the processor reports, so every intent
    /// is auditable.
    pub async fn create_intent(&self, request: CreateIntentRequest) -> CoreResult<CreateIntentOutcome> {
        if request.booking_id.trim().is_empty() {
            return Err(CoreError::Validation("booking_id is required".to_string()));
        }
        let currency = validate_currency(&request.currency)?;
        let amount_minor = to_minor_units(request.amount)?;

        let intent = self
            .processor
            .create_intent(&request.booking_id, amount_minor, &currency)
            .await
            .map_err(|err| CoreError::Internal(format!("payment processor error: {err}")))?;

        let record = PaymentRecord {
            payment_id: intent.id.clone(),
            booking_id: request.booking_id,
            amount_minor: intent.amount_minor,
            currency: intent.currency.to_uppercase(),
            status: if intent.status == ProcessorStatus::Succeeded {
                PaymentStatus::Completed
            } else {
                PaymentStatus::Pending
            },
            created_at: intent.created_at,
        };
        self.store.put_payment(&record).await?;

        info!(payment_id = %record.payment_id, booking_id = %record.booking_id, "payment intent created");

        Ok(CreateIntentOutcome {
            payment_id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    /// Re-fetch the intent from the processor and mark the local record
    /// completed when the processor reports success. Anything else is a
    /// client error carrying the live processor status, not a server fault.
    pub async fn verify_intent(&self, payment_id: &str, booking_id: &str) -> CoreResult<PaymentRecord> {
        if payment_id.trim().is_empty() || booking_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "payment_id and booking_id are required".to_string(),
            ));
        }

        let intent = match self.processor.retrieve_intent(payment_id).await {
            Ok(intent) => intent,
            Err(ProcessorError::NotFound(id)) => {
                return Err(CoreError::NotFound(format!("Payment intent {id}")))
            }
            Err(err) => return Err(CoreError::Upstream(err.to_string())),
        };

        if intent.status != ProcessorStatus::Succeeded {
            return Err(CoreError::Validation(format!(
                "Payment not succeeded, current status: {}",
                intent.status.as_str()
            )));
        }

        let record = PaymentRecord {
            payment_id: intent.id,
            booking_id: booking_id.to_string(),
            amount_minor: intent.amount_minor,
            currency: intent.currency.to_uppercase(),
            status: PaymentStatus::Completed,
            created_at: Utc::now(),
        };
        self.store.put_payment(&record).await?;
        Ok(record)
    }

    /// Refund the intent held for a booking, fully or partially (major
    /// units). On success the local record is deleted: a refunded payment no
    /// longer represents money held.
    pub async fn refund(&self, booking_id: &str, amount: Option<f64>) -> CoreResult<RefundOutcome> {
        let record = self
            .store
            .payment_for_booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Payment intent for booking".to_string()))?;

        let amount_minor = amount.map(to_minor_units).transpose()?;

        let refund = match self.processor.refund(&record.payment_id, amount_minor).await {
            Ok(refund) => refund,
            Err(ProcessorError::NotFound(id)) => {
                return Err(CoreError::NotFound(format!("Payment intent {id}")))
            }
            // Processor-level rejections are an upstream error class, kept
            // apart from our own internal faults.
            Err(err) => return Err(CoreError::Upstream(err.to_string())),
        };

        if !self.store.delete_for_booking(booking_id).await? {
            warn!(booking_id, "refunded payment record was already gone");
        }

        info!(booking_id, refund_id = %refund.id, "payment refunded");

        Ok(RefundOutcome {
            refund_id: refund.id,
            status: refund.status,
            amount: refund.amount_minor as f64 / 100.0,
            currency: refund.currency,
        })
    }

    /// Live processor status for an intent id; unknown intents map to
    /// NotFound so the API can answer 404.
    pub async fn intent_status(&self, payment_id: &str) -> CoreResult<IntentStatus> {
        match self.processor.retrieve_intent(payment_id).await {
            Ok(intent) => Ok(IntentStatus {
                payment_id: intent.id,
                booking_id: intent.booking_id,
                status: intent.status.as_str().to_uppercase(),
            }),
            Err(ProcessorError::NotFound(id)) => Err(CoreError::NotFound(format!("Payment intent {id}"))),
            Err(err) => Err(CoreError::NotFound(format!("Payment intent lookup failed: {err}"))),
        }
    }
}

fn validate_currency(currency: &str) -> CoreResult<String> {
    let trimmed = currency.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::Validation(
            "currency must be a 3-letter code".to_string(),
        ));
    }
    Ok(trimmed.to_uppercase())
}
