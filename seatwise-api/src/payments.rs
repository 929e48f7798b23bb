use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::authorization::{Authorization, Bearer};
use axum_extra::TypedHeader;
use serde::Deserialize;
use serde_json::{json, Value};

use seatwise_payment::CreateIntentRequest;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/payments/create-intent", post(create_intent))
        .route("/api/payments/verify-intent", post(verify_intent))
        .route("/api/payments/refund/{booking_id}", post(refund))
        .route("/api/payments/status/{payment_id}", get(intent_status))
}

async fn create_intent(
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state.payments.create_intent(request).await?;
    Ok(Json(json!(outcome)))
}

#[derive(Debug, Deserialize)]
struct VerifyIntentRequest {
    payment_id: String,
    booking_id: String,
}

async fn verify_intent(
    State(state): State<AppState>,
    Json(request): Json<VerifyIntentRequest>,
) -> Result<Json<Value>, AppError> {
    let record = state
        .payments
        .verify_intent(&request.payment_id, &request.booking_id)
        .await?;
    Ok(Json(json!({
        "message": "Payment verified successfully",
        "payment": {
            "payment_id": record.payment_id,
            "booking_id": record.booking_id,
            "amount": record.amount_major(),
            "currency": record.currency,
            "status": record.status,
        },
    })))
}

#[derive(Debug, Default, Deserialize)]
struct RefundRequest {
    amount: Option<f64>,
}

/// Refunds require a credential even in dev mode: moving money back is not a
/// casually reachable operation.
async fn refund(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    body: Option<Json<RefundRequest>>,
) -> Result<Json<Value>, AppError> {
    if bearer.is_none() {
        return Err(AppError::Unauthorized(
            "Authorization header required".to_string(),
        ));
    }

    let request = body.map(|Json(r)| r).unwrap_or_default();
    let outcome = state.payments.refund(&booking_id, request.amount).await?;
    Ok(Json(json!(outcome)))
}

async fn intent_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let status = state.payments.intent_status(&payment_id).await?;
    Ok(Json(json!(status)))
}
