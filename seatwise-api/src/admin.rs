use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use seatwise_catalog::{EventDraft, EventUpdate};

use crate::error::AppError;
use crate::middleware::auth::{admin_gate, Identity};
use crate::state::AppState;

/// Admin event catalog. Every route sits behind the admin gate.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/events", post(create_event))
        .route("/api/admin/events", get(list_events))
        .route("/api/admin/events/{event_id}", get(get_event))
        .route("/api/admin/events/{event_id}", put(update_event))
        .route("/api/admin/events/{event_id}", delete(delete_event))
        .route_layer(axum::middleware::from_fn_with_state(state, admin_gate))
}

async fn create_event(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(mut draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if let Some(claims) = identity.0 {
        draft.created_by = Some(claims.sub);
    }
    let event = state.catalog.create_event(draft).await?;
    Ok((StatusCode::CREATED, Json(json!(event))))
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let events = state.catalog.list_events().await?;
    Ok(Json(json!({ "events": events })))
}

async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let event = state.catalog.get_event(&event_id).await?;
    Ok(Json(json!(event)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(update): Json<EventUpdate>,
) -> Result<Json<Value>, AppError> {
    let event = state.catalog.update_event(&event_id, update).await?;
    Ok(Json(json!(event)))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.catalog.delete_event(&event_id).await?;
    Ok(Json(json!({ "message": "Event deleted" })))
}
