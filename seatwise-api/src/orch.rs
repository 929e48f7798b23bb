use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use seatwise_core::CoreError;
use seatwise_orch::saga::run_booking_saga;
use seatwise_orch::SagaRequest;
use seatwise_shared::Masked;

use crate::error::AppError;
use crate::middleware::auth::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orch/bookings", post(orchestrate_booking))
        .route("/api/orch/bookings/status/{request_id}", get(request_status))
}

#[derive(Debug, Deserialize)]
struct OrchestrateRequest {
    event_id: Option<String>,
    user_id: Option<String>,
    num_tickets: Option<i64>,
    amount: Option<f64>,
    currency: Option<String>,
    seat_numbers: Option<Vec<String>>,
    email: Option<String>,
    phone_number: Option<String>,
    /// "sync" (default) executes the saga inline; "async" queues it.
    mode: Option<String>,
}

/// Run or enqueue the booking saga. The effective user id comes from the
/// verified claims when a verifier is configured; the body field is only
/// honored in dev mode.
async fn orchestrate_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<OrchestrateRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if state.verifier.is_some() && identity.0.is_none() {
        return Err(AppError::Unauthorized("authentication required".to_string()));
    }

    let user_id = match identity.0 {
        Some(claims) => claims.sub,
        None => body.user_id.clone().unwrap_or_default(),
    };

    let event_id = require_field(body.event_id.clone(), "event_id")?;
    let amount = body
        .amount
        .ok_or_else(|| CoreError::Validation("amount is required".to_string()))?;
    let currency = require_field(body.currency.clone(), "currency")?;
    if user_id.trim().is_empty() {
        return Err(CoreError::Validation("user_id is required".to_string()).into());
    }

    let request = SagaRequest {
        request_id: String::new(),
        event_id,
        user_id,
        num_tickets: body.num_tickets.unwrap_or(1),
        amount,
        currency,
        seat_numbers: body.seat_numbers,
        email: body.email.map(Masked),
        phone_number: body.phone_number.map(Masked),
    };

    if body.mode.as_deref() == Some("async") {
        let accepted = state.coordinator.enqueue(request).await?;
        return Ok((StatusCode::ACCEPTED, Json(json!(accepted))));
    }

    let mut request = request;
    request.request_id = Uuid::new_v4().to_string();
    if request.num_tickets <= 0 {
        return Err(CoreError::Validation("num_tickets must be a positive integer".to_string()).into());
    }

    let outcome = run_booking_saga(&state.saga, &request).await?;
    Ok((StatusCode::CREATED, Json(json!(outcome))))
}

fn require_field(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{name} is required")).into()),
    }
}

/// Status poll for async requests. A store failure here maps to 503: the
/// request may be fine, the tracker is not.
async fn request_status(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    match state.tracker.get(&request_id).await {
        Ok(record) => Ok(Json(json!(record))),
        Err(CoreError::Internal(message)) => Err(AppError::Unavailable(message)),
        Err(err) => Err(err.into()),
    }
}
