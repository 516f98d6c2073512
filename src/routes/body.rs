//! Lenient JSON body extractor.
//!
//! Bodies are only parsed when the request declares a JSON content type.
//! A missing body or any other content type yields an empty document so the
//! handler still runs. A declared-JSON body that fails to parse, is not an
//! object, or holds strings the store cannot keep is a 400.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;

use crate::db::Document;
use crate::error::ApiError;

/// Request body as a schemaless document. Use as the last handler parameter.
pub struct JsonBody(pub Document);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Ok(Self(Document::new()));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Document::new()));
        }

        let doc: Document = serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
        if contains_nul(&doc) {
            return Err(ApiError::InvalidBody("strings may not contain NUL characters".into()));
        }
        Ok(Self(doc))
    }
}

/// `application/json` or any `application/*+json`, parameters ignored.
pub(crate) fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Postgres JSONB cannot store U+0000, in keys or string values.
fn contains_nul(doc: &Document) -> bool {
    doc.iter()
        .any(|(key, value)| key.contains('\0') || value_contains_nul(value))
}

fn value_contains_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(value_contains_nul),
        Value::Object(map) => contains_nul(map),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}
