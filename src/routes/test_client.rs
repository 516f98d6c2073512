//! Drives the real router in-process for route tests.

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON body; `Value::Null` when the body is empty.
    pub body: Value,
}

/// Send one request through `app`. `token` becomes a bearer header; a JSON
/// body is sent as `application/json`, `None` sends no body or content type.
pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
    match body {
        Some(json) => {
            let bytes = serde_json::to_vec(&json).unwrap();
            send_raw(app, method, uri, token, Some("application/json"), bytes).await
        }
        None => send_raw(app, method, uri, token, None, Vec::new()).await,
    }
}

/// Send raw body bytes with an optional `Content-Type`.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    let request = builder.body(body.into()).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    TestResponse { status, body }
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> TestResponse {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
    send(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> TestResponse {
    send(app, Method::DELETE, uri, token, None).await
}

/// `insertedId` from a 201 insert response.
pub fn inserted_id(response: &TestResponse) -> String {
    response.body["insertedId"]
        .as_str()
        .expect("insert response should carry insertedId")
        .to_owned()
}
