//! Identity verification — bearer tokens checked by the external provider.
//!
//! DESIGN
//! ======
//! The server never inspects token contents. [`IdentityVerifier`] is the only
//! seam: the production adapter hands the raw ID token to the Identity
//! Toolkit `accounts:lookup` endpoint and trusts its answer. Nothing is
//! cached, so a revoked or expired token fails on the very next request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;

const IDENTITY_TOOLKIT_HOST: &str = "https://identitytoolkit.googleapis.com";
const LOOKUP_PATH: &str = "/v1/accounts:lookup";

// =============================================================================
// TYPES
// =============================================================================

/// Caller identity established by a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub email: String,
    pub name: Option<String>,
}

impl Identity {
    /// Display name, falling back to the email when none is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("token rejected: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
    #[error("failed to build identity client: {0}")]
    HttpClientBuild(String),
}

/// Verifies an opaque bearer token and returns who presented it.
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

// =============================================================================
// FIREBASE ADAPTER
// =============================================================================

pub struct FirebaseVerifier {
    http: reqwest::Client,
    lookup_url: String,
    api_key: String,
}

impl FirebaseVerifier {
    /// Build the adapter from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, lookup_url: lookup_url(config.emulator_host.as_deref()), api_key: config.api_key.clone() })
    }

    #[must_use]
    pub fn lookup_url(&self) -> &str {
        &self.lookup_url
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let response = self
            .http
            .post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        parse_lookup_response(status, &body)
    }
}

/// Resolve the lookup endpoint, routing to the auth emulator when configured.
fn lookup_url(emulator_host: Option<&str>) -> String {
    match emulator_host {
        Some(host) => format!("http://{host}/identitytoolkit.googleapis.com{LOOKUP_PATH}"),
        None => format!("{IDENTITY_TOOLKIT_HOST}{LOOKUP_PATH}"),
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a raw `accounts:lookup` reply into an identity.
///
/// 400-class replies mean the provider looked at the token and refused it;
/// anything else unexpected means we could not get an answer.
fn parse_lookup_response(status: u16, body: &str) -> Result<Identity, AuthError> {
    if (400..500).contains(&status) {
        let reason = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("status {status}"));
        return Err(AuthError::Rejected(reason));
    }
    if status != 200 {
        return Err(AuthError::Unavailable(format!("status {status}: {body}")));
    }

    let parsed: LookupResponse =
        serde_json::from_str(body).map_err(|e| AuthError::Unavailable(format!("unexpected response: {e}")))?;
    let user = parsed
        .users
        .into_iter()
        .next()
        .ok_or_else(|| AuthError::Rejected("no user for token".into()))?;
    let email = user
        .email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AuthError::Rejected("identity has no email".into()))?;

    Ok(Identity { email, name: user.display_name })
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
