use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use seatwise_booking::ReserveRequest;

use crate::error::AppError;
use crate::middleware::auth::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/{event_id}", get(get_event))
        .route("/api/events/{event_id}/book", post(book))
}

async fn list_events(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    require_identity(&state, &identity)?;
    let events = state.catalog.list_events().await?;
    Ok(Json(json!({ "events": events })))
}

async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    require_identity(&state, &identity)?;
    let event = state.catalog.get_event(&event_id).await?;
    Ok(Json(json!(event)))
}

/// Catalog reads are for authenticated users once a verifier is configured;
/// without one (dev mode) they stay open.
fn require_identity(state: &AppState, identity: &Identity) -> Result<(), AppError> {
    if state.verifier.is_some() && identity.0.is_none() {
        return Err(AppError::Unauthorized("authentication required".to_string()));
    }
    Ok(())
}

/// Reserve seats. The verified identity, when present, overrides any
/// caller-supplied `user_id`; without a verifier the body field is trusted.
async fn book(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Extension(identity): Extension<Identity>,
    body: Option<Json<ReserveRequest>>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut request = body.map(|Json(r)| r).unwrap_or_default();
    if let Some(claims) = identity.0 {
        request.user_id = Some(claims.sub);
    }

    let outcome = state.engine.reserve(&event_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking successful",
            "booking": outcome.booking,
            "remaining_seats": outcome.remaining_seats,
        })),
    ))
}
