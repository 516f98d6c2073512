//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! carries the two external collaborators, the document store and the
//! identity verifier, as trait objects built once in `main`. Handlers hold no
//! other state between requests.

use std::sync::Arc;

use crate::db::DocumentStore;
use crate::services::identity::IdentityVerifier;

/// Shared application state. Cloning only bumps the `Arc` counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { store, verifier }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
