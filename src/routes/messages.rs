//! Contact message routes. Anyone may write; reading needs a verified caller.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use super::auth::AuthUser;
use super::body::JsonBody;
use crate::db::{Collection, InsertOneResult, StoredDocument};
use crate::error::ApiError;
use crate::services::documents;
use crate::state::AppState;

/// `POST /messages` — store the body as sent, plus `createdAt`.
pub async fn create_message(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<InsertOneResult>), ApiError> {
    let created_at = documents::timestamp_now().map_err(ApiError::clock("Failed to save message"))?;
    let result = state
        .store
        .insert_one(Collection::Messages, documents::new_message(body, created_at))
        .await
        .map_err(ApiError::store("Failed to save message"))?;

    info!(id = %result.inserted_id, "message received");
    Ok((StatusCode::CREATED, Json(result)))
}

/// `GET /messages`
pub async fn list_messages(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    let docs = state
        .store
        .find_all(Collection::Messages)
        .await
        .map_err(ApiError::store("Failed to load messages"))?;
    Ok(Json(docs))
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;
