use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use seatwise_shared::Masked;

/// One orchestrated booking submission. `request_id` correlates the queue
/// message, the status record and the logs; contact fields are optional and
/// only drive the best-effort notification leg.
#[derive(Clone, Serialize, Deserialize)]
pub struct SagaRequest {
    pub request_id: String,
    pub event_id: String,
    pub user_id: String,
    #[serde(default = "default_tickets")]
    pub num_tickets: i64,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub seat_numbers: Option<Vec<String>>,
    #[serde(default)]
    pub email: Option<Masked<String>>,
    #[serde(default)]
    pub phone_number: Option<Masked<String>>,
}

fn default_tickets() -> i64 {
    1
}

impl std::fmt::Debug for SagaRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SagaRequest")
            .field("request_id", &self.request_id)
            .field("event_id", &self.event_id)
            .field("user_id", &self.user_id)
            .field("num_tickets", &self.num_tickets)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

/// Saga failures carry a structured code naming the step that failed.
/// `BookingInvalidResponse` is deliberately distinct from `BookingFailed`:
/// the booking may have succeeded downstream, leaving an inconsistent state
/// that needs operator attention rather than a retry.
#[derive(Debug, thiserror::Error)]
pub enum SagaError {
    #[error("booking step failed: {0}")]
    BookingFailed(String),

    #[error("booking service returned no booking_id: {0}")]
    BookingInvalidResponse(String),

    #[error("payment intent step failed: {0}")]
    PaymentIntentFailed(String),
}

impl SagaError {
    pub fn code(&self) -> &'static str {
        match self {
            SagaError::BookingFailed(_) => "BOOKING_FAILED",
            SagaError::BookingInvalidResponse(_) => "BOOKING_INVALID_RESPONSE",
            SagaError::PaymentIntentFailed(_) => "PAYMENT_INTENT_FAILED",
        }
    }
}

/// Reserve step collaborator. Errors carry the downstream message verbatim.
#[async_trait]
pub trait BookingClient: Send + Sync {
    async fn reserve(&self, request: &SagaRequest) -> Result<Value, String>;
}

/// Payment-intent step collaborator.
#[async_trait]
pub trait PaymentClient: Send + Sync {
    async fn create_intent(
        &self,
        booking_id: &str,
        amount: f64,
        currency: &str,
    ) -> Result<Value, String>;
}

/// Notification dispatch. Failures here are folded into warnings and never
/// fail the saga.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, email: &str, subject: &str, message: &str) -> Result<(), String>;

    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<(), String>;
}

#[derive(Debug, Clone)]
pub struct SagaDeps {
    pub booking: Arc<dyn BookingClient>,
    pub payment: Arc<dyn PaymentClient>,
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for dyn BookingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BookingClient")
    }
}

impl std::fmt::Debug for dyn PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PaymentClient")
    }
}

impl std::fmt::Debug for dyn Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Notifier")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SagaOutcome {
    pub booking: Value,
    pub payment: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Drive the booking → payment → notification saga.
///
/// Hard-failure policy: the saga stops at the first failing critical step and
/// reports which step failed. A payment failure after a successful
/// reservation does NOT roll the reservation back: inventory is never
/// released automatically, compensation (cancel) is an explicit follow-up.
/// The notification leg is soft: failures become warnings.
pub async fn run_booking_saga(deps: &SagaDeps, request: &SagaRequest) -> Result<SagaOutcome, SagaError> {
    info!(request_id = %request.request_id, event_id = %request.event_id, "saga started");

    // Step 1: reserve seats.
    let booking_response = deps
        .booking
        .reserve(request)
        .await
        .map_err(SagaError::BookingFailed)?;

    // Step 2: the booking id must be present; its absence is a protocol
    // violation, not a booking failure.
    let booking = booking_response
        .get("booking")
        .cloned()
        .unwrap_or_else(|| booking_response.clone());
    let booking_id = booking
        .get("booking_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SagaError::BookingInvalidResponse(booking_response.to_string()))?;

    // Step 3: create the payment intent. No rollback on failure.
    let payment = deps
        .payment
        .create_intent(&booking_id, request.amount, &request.currency)
        .await
        .map_err(SagaError::PaymentIntentFailed)?;

    // Step 4: best-effort notifications.
    let mut warnings = Vec::new();
    if let Some(email) = &request.email {
        let message = format!(
            "Your booking {booking_id} for event {} is confirmed.",
            request.event_id
        );
        if let Err(err) = deps
            .notifier
            .send_email(email.as_inner(), "Booking confirmation", &message)
            .await
        {
            warn!(request_id = %request.request_id, "email notification failed: {err}");
            warnings.push(format!("email notification failed: {err}"));
        }
    }
    if let Some(phone) = &request.phone_number {
        let message = format!("Booking {booking_id} confirmed.");
        if let Err(err) = deps.notifier.send_sms(phone.as_inner(), &message).await {
            warn!(request_id = %request.request_id, "sms notification failed: {err}");
            warnings.push(format!("sms notification failed: {err}"));
        }
    }

    info!(request_id = %request.request_id, booking_id = %booking_id, "saga completed");

    Ok(SagaOutcome { booking, payment, warnings })
}

/// Notifier that only logs; the default when no notification service is
/// configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_email(&self, _email: &str, subject: &str, _message: &str) -> Result<(), String> {
        info!(subject, "email notification (log only)");
        Ok(())
    }

    async fn send_sms(&self, _phone_number: &str, _message: &str) -> Result<(), String> {
        info!("sms notification (log only)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubBooking {
        result: Mutex<Option<Result<Value, String>>>,
    }

    #[async_trait]
    impl BookingClient for StubBooking {
        async fn reserve(&self, _request: &SagaRequest) -> Result<Value, String> {
            self.result.lock().unwrap().take().unwrap()
        }
    }

    struct StubPayment {
        result: Mutex<Option<Result<Value, String>>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PaymentClient for StubPayment {
        async fn create_intent(
            &self,
            booking_id: &str,
            _amount: f64,
            _currency: &str,
        ) -> Result<Value, String> {
            self.calls.lock().unwrap().push(booking_id.to_string());
            self.result.lock().unwrap().take().unwrap()
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_email(&self, _: &str, _: &str, _: &str) -> Result<(), String> {
            Err("mailer unreachable".to_string())
        }

        async fn send_sms(&self, _: &str, _: &str) -> Result<(), String> {
            Err("sms provider unreachable".to_string())
        }
    }

    fn request() -> SagaRequest {
        SagaRequest {
            request_id: "req-1".to_string(),
            event_id: "1".to_string(),
            user_id: "user-1".to_string(),
            num_tickets: 2,
            amount: 100.0,
            currency: "USD".to_string(),
            seat_numbers: None,
            email: None,
            phone_number: None,
        }
    }

    fn deps(
        booking: Result<Value, String>,
        payment: Result<Value, String>,
        notifier: Arc<dyn Notifier>,
    ) -> (SagaDeps, Arc<StubPayment>) {
        let payment_stub = Arc::new(StubPayment {
            result: Mutex::new(Some(payment)),
            calls: Mutex::new(Vec::new()),
        });
        (
            SagaDeps {
                booking: Arc::new(StubBooking { result: Mutex::new(Some(booking)) }),
                payment: payment_stub.clone(),
                notifier,
            },
            payment_stub,
        )
    }

    #[tokio::test]
    async fn happy_path_returns_booking_and_payment() {
        let booking_response = json!({
            "message": "Booking successful",
            "booking": {"booking_id": "b-1", "num_tickets": 2},
            "remaining_seats": 3
        });
        let (deps, payments) = deps(
            Ok(booking_response),
            Ok(json!({"payment_id": "pi_1", "client_secret": "pi_1_secret"})),
            Arc::new(LogNotifier),
        );

        let outcome = run_booking_saga(&deps, &request()).await.unwrap();
        assert_eq!(outcome.booking["booking_id"], "b-1");
        assert_eq!(outcome.payment["payment_id"], "pi_1");
        assert!(outcome.warnings.is_empty());
        assert_eq!(payments.calls.lock().unwrap().as_slice(), ["b-1"]);
    }

    #[tokio::test]
    async fn booking_failure_stops_the_saga() {
        let (deps, payments) = deps(
            Err("Not enough seats available".to_string()),
            Ok(json!({})),
            Arc::new(LogNotifier),
        );

        let err = run_booking_saga(&deps, &request()).await.unwrap_err();
        assert_eq!(err.code(), "BOOKING_FAILED");
        assert!(err.to_string().contains("Not enough seats"));
        // The payment step never ran.
        assert!(payments.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_booking_id_is_a_protocol_violation() {
        let (deps, payments) = deps(
            Ok(json!({"message": "Booking successful"})),
            Ok(json!({})),
            Arc::new(LogNotifier),
        );

        let err = run_booking_saga(&deps, &request()).await.unwrap_err();
        assert_eq!(err.code(), "BOOKING_INVALID_RESPONSE");
        assert!(payments.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn payment_failure_reports_code_without_rollback() {
        let (deps, _) = deps(
            Ok(json!({"booking": {"booking_id": "b-9"}})),
            Err("processor unavailable".to_string()),
            Arc::new(LogNotifier),
        );

        let err = run_booking_saga(&deps, &request()).await.unwrap_err();
        assert_eq!(err.code(), "PAYMENT_INTENT_FAILED");
    }

    #[tokio::test]
    async fn notification_failures_become_warnings() {
        let (deps, _) = deps(
            Ok(json!({"booking": {"booking_id": "b-2"}})),
            Ok(json!({"payment_id": "pi_2"})),
            Arc::new(FailingNotifier),
        );

        let mut req = request();
        req.email = Some(Masked("alice@example.com".to_string()));
        req.phone_number = Some(Masked("+6591234567".to_string()));

        let outcome = run_booking_saga(&deps, &req).await.unwrap();
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings[0].contains("email"));
        assert!(outcome.warnings[1].contains("sms"));
    }
}
