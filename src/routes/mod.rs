//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the three collection APIs plus a health probe under one Axum router
//! with a permissive CORS policy and per-request tracing. Authentication is
//! per handler via the [`auth::AuthUser`] extractor, so public and protected
//! verbs can share a path.

pub mod auth;
pub mod body;
pub mod bookings;
pub mod messages;
pub mod services;
#[cfg(test)]
pub(crate) mod test_client;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/services", get(services::list_services).post(services::create_service))
        .route(
            "/services/{id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/bookings/{id}", patch(bookings::update_booking_status))
        .route("/messages", get(messages::list_messages).post(messages::create_message))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
