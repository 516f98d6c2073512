//! Booking routes. Every operation requires a verified caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use super::auth::AuthUser;
use super::body::JsonBody;
use crate::db::{Collection, DocumentId, InsertOneResult, StoredDocument, UpdateResult};
use crate::error::ApiError;
use crate::services::documents;
use crate::state::AppState;

/// `POST /bookings` — book on behalf of the caller; status starts pending.
pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<InsertOneResult>), ApiError> {
    let created_at = documents::timestamp_now().map_err(ApiError::clock("Failed to save booking"))?;
    let doc = documents::new_booking(body, &auth.identity, created_at);
    let result = state
        .store
        .insert_one(Collection::Bookings, doc)
        .await
        .map_err(ApiError::store("Failed to save booking"))?;

    info!(id = %result.inserted_id, customer = %auth.identity.email, "booking created");
    Ok((StatusCode::CREATED, Json(result)))
}

/// `GET /bookings` — all bookings, not just the caller's.
pub async fn list_bookings(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    let docs = state
        .store
        .find_all(Collection::Bookings)
        .await
        .map_err(ApiError::store("Failed to load bookings"))?;
    Ok(Json(docs))
}

/// `PATCH /bookings/:id` — set `serviceStatus` and nothing else.
pub async fn update_booking_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<UpdateResult>, ApiError> {
    let id: DocumentId = id.parse()?;
    let patch = documents::status_patch(body);
    let status = patch.get(documents::SERVICE_STATUS).cloned().unwrap_or_default();
    let result = state
        .store
        .update_one(Collection::Bookings, id, patch)
        .await
        .map_err(ApiError::store("Failed to update booking"))?;

    info!(%id, %status, by = %auth.identity.email, matched = result.matched_count, "booking status updated");
    Ok(Json(result))
}

#[cfg(test)]
#[path = "bookings_test.rs"]
mod tests;
