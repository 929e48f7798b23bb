use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use seatwise_core::payment::{
    PaymentProcessor, ProcessorError, ProcessorIntent, ProcessorRefund, ProcessorStatus,
};

/// In-memory stand-in for the external payment processor, used by tests and
/// local development wiring. Intents start in `requires_payment_method` and
/// are flipped to `succeeded` explicitly, mirroring the confirm step a real
/// client performs out of band.
#[derive(Default)]
pub struct MockProcessor {
    intents: Mutex<HashMap<String, ProcessorIntent>>,
    fail_create: Mutex<Option<String>>,
    fail_refund: Mutex<Option<String>>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next create_intent call fail with the given message.
    pub fn fail_next_create(&self, message: &str) {
        *self.fail_create.lock().unwrap() = Some(message.to_string());
    }

    /// Make the next refund call be rejected with the given message.
    pub fn fail_next_refund(&self, message: &str) {
        *self.fail_refund.lock().unwrap() = Some(message.to_string());
    }

    /// Simulate the client confirming the payment.
    pub fn mark_succeeded(&self, intent_id: &str) {
        if let Some(intent) = self.intents.lock().unwrap().get_mut(intent_id) {
            intent.status = ProcessorStatus::Succeeded;
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_intent(
        &self,
        booking_id: &str,
        amount_minor: i64,
        currency: &str,
    ) -> Result<ProcessorIntent, ProcessorError> {
        if let Some(message) = self.fail_create.lock().unwrap().take() {
            return Err(ProcessorError::Transport(message));
        }

        let id = format!("pi_{}", Uuid::new_v4().simple());
        let intent = ProcessorIntent {
            id: id.clone(),
            booking_id: booking_id.to_string(),
            amount_minor,
            currency: currency.to_string(),
            status: ProcessorStatus::RequiresPaymentMethod,
            client_secret: Some(format!("{id}_secret_{}", Uuid::new_v4().simple())),
            created_at: Utc::now(),
        };
        self.intents.lock().unwrap().insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<ProcessorIntent, ProcessorError> {
        self.intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| ProcessorError::NotFound(intent_id.to_string()))
    }

    async fn refund(
        &self,
        intent_id: &str,
        amount_minor: Option<i64>,
    ) -> Result<ProcessorRefund, ProcessorError> {
        if let Some(message) = self.fail_refund.lock().unwrap().take() {
            return Err(ProcessorError::Rejected(message));
        }

        let intents = self.intents.lock().unwrap();
        let intent = intents
            .get(intent_id)
            .ok_or_else(|| ProcessorError::NotFound(intent_id.to_string()))?;

        Ok(ProcessorRefund {
            id: format!("re_{}", Uuid::new_v4().simple()),
            status: "succeeded".to_string(),
            amount_minor: amount_minor.unwrap_or(intent.amount_minor),
            currency: intent.currency.clone(),
        })
    }
}
