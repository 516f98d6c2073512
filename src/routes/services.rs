//! Service listing routes. Reads are public; writes need a verified caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use super::auth::AuthUser;
use super::body::JsonBody;
use crate::db::{Collection, DeleteResult, DocumentId, InsertOneResult, StoredDocument, UpdateResult};
use crate::error::ApiError;
use crate::services::documents;
use crate::state::AppState;

/// `POST /services` — create a listing owned by the caller.
pub async fn create_service(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<InsertOneResult>), ApiError> {
    let created_at = documents::timestamp_now().map_err(ApiError::clock("Failed to add service"))?;
    let doc = documents::new_service(body, &auth.identity, created_at);
    let result = state
        .store
        .insert_one(Collection::Services, doc)
        .await
        .map_err(ApiError::store("Failed to add service"))?;

    info!(id = %result.inserted_id, provider = %auth.identity.email, "service created");
    Ok((StatusCode::CREATED, Json(result)))
}

/// `GET /services` — every listing.
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<StoredDocument>>, ApiError> {
    let docs = state
        .store
        .find_all(Collection::Services)
        .await
        .map_err(ApiError::store("Failed to load services"))?;
    Ok(Json(docs))
}

/// `GET /services/:id` — one listing, or `null`.
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<StoredDocument>>, ApiError> {
    let id: DocumentId = id.parse()?;
    let doc = state
        .store
        .find_one(Collection::Services, id)
        .await
        .map_err(ApiError::store("Failed to load service"))?;
    Ok(Json(doc))
}

/// `PUT /services/:id` — merge the body into the listing.
pub async fn update_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<UpdateResult>, ApiError> {
    let id: DocumentId = id.parse()?;
    let result = state
        .store
        .update_one(Collection::Services, id, documents::service_patch(body))
        .await
        .map_err(ApiError::store("Failed to update service"))?;

    info!(%id, by = %auth.identity.email, matched = result.matched_count, "service updated");
    Ok(Json(result))
}

/// `DELETE /services/:id`
pub async fn delete_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id: DocumentId = id.parse()?;
    let result = state
        .store
        .delete_one(Collection::Services, id)
        .await
        .map_err(ApiError::store("Failed to delete service"))?;

    info!(%id, by = %auth.identity.email, deleted = result.deleted_count, "service deleted");
    Ok(Json(result))
}

#[cfg(test)]
#[path = "services_test.rs"]
mod tests;
