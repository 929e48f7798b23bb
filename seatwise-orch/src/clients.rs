use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::saga::{BookingClient, Notifier, PaymentClient, SagaRequest};
use seatwise_core::{CoreError, CoreResult};

const DOWNSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client() -> CoreResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DOWNSTREAM_TIMEOUT)
        .build()
        .map_err(|err| CoreError::Internal(format!("failed to build http client: {err}")))
}

/// Read the response body as text, treating any HTTP error status as a step
/// failure whose message is the downstream body verbatim.
async fn into_json(response: reqwest::Response) -> Result<Value, String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| format!("failed to read downstream response: {err}"))?;

    if !status.is_success() {
        return Err(if body.is_empty() {
            format!("downstream returned {status}")
        } else {
            body
        });
    }

    serde_json::from_str(&body).map_err(|err| format!("downstream returned invalid JSON: {err}"))
}

/// Booking service client used by the saga's reserve step.
pub struct HttpBookingClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingClient {
    pub fn new(base_url: &str) -> CoreResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl BookingClient for HttpBookingClient {
    async fn reserve(&self, request: &SagaRequest) -> Result<Value, String> {
        let url = format!("{}/api/events/{}/book", self.base_url, request.event_id);
        debug!(%url, request_id = %request.request_id, "reserving seats");

        let mut body = json!({
            "user_id": request.user_id,
            "num_tickets": request.num_tickets,
        });
        if let Some(seats) = &request.seat_numbers {
            body["seat_numbers"] = json!(seats);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| format!("booking service unreachable: {err}"))?;
        into_json(response).await
    }
}

/// Payment service client used by the saga's create-intent step.
pub struct HttpPaymentClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentClient {
    pub fn new(base_url: &str) -> CoreResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentClient for HttpPaymentClient {
    async fn create_intent(
        &self,
        booking_id: &str,
        amount: f64,
        currency: &str,
    ) -> Result<Value, String> {
        let url = format!("{}/api/payments/create-intent", self.base_url);
        debug!(%url, booking_id, "creating payment intent");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "booking_id": booking_id,
                "amount": amount,
                "currency": currency,
            }))
            .send()
            .await
            .map_err(|err| format!("payment service unreachable: {err}"))?;
        into_json(response).await
    }
}

/// Notification service client. Errors propagate as strings and the saga
/// downgrades them to warnings.
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    pub fn new(base_url: &str) -> CoreResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<(), String> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| format!("notification service unreachable: {err}"))?;
        into_json(response).await.map(|_| ())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_email(&self, email: &str, subject: &str, message: &str) -> Result<(), String> {
        self.post(
            "/api/notifications/email",
            json!({"email": email, "subject": subject, "message": message}),
        )
        .await
    }

    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<(), String> {
        self.post(
            "/api/notifications/sms",
            json!({"phone_number": phone_number, "message": message}),
        )
        .await
    }
}
