//! Document shaping — stamps server-controlled fields onto client bodies.
//!
//! Client bodies are accepted as-is apart from the handful of keys the server
//! owns. Those are always overwritten on create and stripped from patches, so
//! ownership and timestamps can only come from the verified caller and the
//! clock.

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::identity::Identity;
use crate::db::{Document, ID_FIELD};

pub const CREATED_AT: &str = "createdAt";
pub const PROVIDER_EMAIL: &str = "providerEmail";
pub const PROVIDER_NAME: &str = "providerName";
pub const CUSTOMER_EMAIL: &str = "customerEmail";
pub const CUSTOMER_NAME: &str = "customerName";
pub const SERVICE_STATUS: &str = "serviceStatus";

pub const STATUS_PENDING: &str = "pending";

/// Keys a service update may never touch.
const SERVICE_PROTECTED_FIELDS: [&str; 4] = [ID_FIELD, CREATED_AT, PROVIDER_EMAIL, PROVIDER_NAME];

/// Current UTC time as an RFC 3339 string.
///
/// # Errors
///
/// Returns an error if the clock value cannot be formatted.
pub fn timestamp_now() -> Result<Value, time::error::Format> {
    OffsetDateTime::now_utc().format(&Rfc3339).map(Value::String)
}

fn stamp(mut body: Document, created_at: Value) -> Document {
    body.remove(ID_FIELD);
    body.insert(CREATED_AT.into(), created_at);
    body
}

/// Service listing owned by the verified caller.
#[must_use]
pub fn new_service(body: Document, provider: &Identity, created_at: Value) -> Document {
    let mut doc = stamp(body, created_at);
    doc.insert(PROVIDER_EMAIL.into(), Value::String(provider.email.clone()));
    doc.insert(PROVIDER_NAME.into(), Value::String(provider.display_name().to_owned()));
    doc
}

/// Booking made by the verified caller. Status always starts as pending.
#[must_use]
pub fn new_booking(body: Document, customer: &Identity, created_at: Value) -> Document {
    let mut doc = stamp(body, created_at);
    doc.insert(CUSTOMER_EMAIL.into(), Value::String(customer.email.clone()));
    doc.insert(CUSTOMER_NAME.into(), Value::String(customer.display_name().to_owned()));
    doc.insert(SERVICE_STATUS.into(), Value::String(STATUS_PENDING.into()));
    doc
}

#[must_use]
pub fn new_message(body: Document, created_at: Value) -> Document {
    stamp(body, created_at)
}

/// Merge-patch for a service, minus the server-owned keys.
#[must_use]
pub fn service_patch(mut body: Document) -> Document {
    for key in SERVICE_PROTECTED_FIELDS {
        body.remove(key);
    }
    body
}

/// Patch that sets only `serviceStatus`. An absent status is written as null.
#[must_use]
pub fn status_patch(mut body: Document) -> Document {
    let status = body.remove(SERVICE_STATUS).unwrap_or(Value::Null);
    let mut patch = Document::new();
    patch.insert(SERVICE_STATUS.into(), status);
    patch
}

#[cfg(test)]
#[path = "documents_test.rs"]
mod tests;
