use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::middleware::auth::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings))
        .route("/api/bookings/{booking_id}", delete(cancel_booking))
}

#[derive(Debug, Deserialize)]
struct BookingsQuery {
    user_id: Option<String>,
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = identity
        .0
        .map(|claims| claims.sub)
        .or(query.user_id)
        .unwrap_or_default();

    let bookings = state.engine.bookings_for_user(&user_id).await?;
    Ok(Json(json!({ "bookings": bookings })))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let outcome = state.engine.cancel(&booking_id).await?;
    Ok(Json(json!({
        "message": "Booking cancelled successfully",
        "restored_seats": outcome.restored_seats,
        "updated_total_seats": outcome.updated_total_seats,
    })))
}
