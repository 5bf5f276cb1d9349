//! Remote key/value source over HTTP.
//!
//! The wire format is deliberately minimal: values are opaque bytes and keys
//! are path segments.
//!
//! | Method | Path           | Success        | Absent |
//! |--------|----------------|----------------|--------|
//! | `GET`  | `/v0/kv/{key}` | `200` + body   | `404`  |
//! | `PUT`  | `/v0/kv/{key}` | `204`          |        |
//! | `HEAD` | `/v0/kv/{key}` | `200`          | `404`  |
//! | `GET`  | `/health`      | `200` + JSON   |        |
//!
//! [`HttpSource`] is the reqwest client; [`router`] builds the axum server
//! that exposes any other [`Source`] with the same routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use reqwest::Url;
use serde_json::json;
use tracing::{debug, warn};

use super::{Source, SourceError, validate_key};
use crate::{Error, ErrorKind, Result};

/// Largest value the server accepts in a `PUT`.
pub const MAX_VALUE_SIZE: usize = 64 * 1024 * 1024;

/// A [`Source`] backed by a remote server speaking the `/v0/kv` protocol.
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: String,
    base: Url,
    client: reqwest::Client,
}

impl HttpSource {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let invalid = |reason: String| SourceError::InvalidAddress {
            address: base_url.to_string(),
            reason,
        };

        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())).into());
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            name: format!("http:{}", base.as_str().trim_end_matches('/')),
            base,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Checks the server's `/health` endpoint.
    pub async fn health(&self) -> Result<()> {
        let url = self.join("health", "")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.unavailable("", e.to_string()))?;
        if !response.status().is_success() {
            return Err(self.unavailable("", format!("server returned {}", response.status())));
        }
        Ok(())
    }

    fn url_for(&self, key: &str) -> Result<Url> {
        validate_key(key)?;
        self.join(&format!("v0/kv/{key}"), key)
    }

    fn join(&self, path: &str, key: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| self.unavailable(key, format!("failed to build URL: {e}")))
    }

    fn unavailable(&self, key: &str, reason: String) -> Error {
        SourceError::Unavailable {
            source_name: self.name.clone(),
            key: key.to_string(),
            reason,
        }
        .into()
    }

    /// Maps an unexpected response status to an error.
    fn status_error(&self, key: &str, status: StatusCode) -> Error {
        if status == StatusCode::BAD_REQUEST {
            return SourceError::InvalidKey {
                key: key.to_string(),
                reason: format!("rejected by {}", self.name),
            }
            .into();
        }
        self.unavailable(key, format!("server returned {status}"))
    }

    fn not_found(&self, key: &str) -> Error {
        SourceError::NotFound {
            source_name: self.name.clone(),
            key: key.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl Source for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(key)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.unavailable(key, e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(self.not_found(key)),
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| self.unavailable(key, format!("failed to read body: {e}")))?;
                debug!(source = %self.name, key, bytes = body.len(), "Fetched value");
                Ok(body.to_vec())
            }
            status => Err(self.status_error(key, status)),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let url = self.url_for(key)?;
        let response = self
            .client
            .put(url)
            .body(value.to_vec())
            .send()
            .await
            .map_err(|e| self.unavailable(key, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(key, status));
        }
        debug!(source = %self.name, key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let url = self.url_for(key)?;
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| self.unavailable(key, e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(self.status_error(key, status)),
        }
    }
}

/// Builds an axum router exposing `source` over the `/v0/kv` protocol.
pub fn router(source: Arc<dyn Source>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/v0/kv/{key}",
            get(get_value).put(put_value).head(head_value),
        )
        .layer(DefaultBodyLimit::max(MAX_VALUE_SIZE))
        .with_state(source)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn get_value(
    State(source): State<Arc<dyn Source>>,
    Path(key): Path<String>,
) -> Response {
    match source.get(&key).await {
        Ok(value) => (StatusCode::OK, value).into_response(),
        Err(e) => error_response(&key, &e),
    }
}

async fn put_value(
    State(source): State<Arc<dyn Source>>,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    match source.set(&key, &body).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&key, &e),
    }
}

async fn head_value(
    State(source): State<Arc<dyn Source>>,
    Path(key): Path<String>,
) -> Response {
    match source.exists(&key).await {
        Ok(true) => StatusCode::OK.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => error_response(&key, &e),
    }
}

fn error_response(key: &str, err: &Error) -> Response {
    let status = match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::SourceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(key, error = %err, "Request failed");
    }
    (status, err.to_string()).into_response()
}
