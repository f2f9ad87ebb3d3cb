//! Shared HTTP plumbing for the Scaleway REST APIs.
//!
//! None of the services this crate manages are covered by a published Rust
//! SDK, so each service module drives the JSON API directly through the
//! shared client below.

pub mod locality;

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Root of the public Scaleway API.
pub const DEFAULT_API_ROOT: &str = "https://api.scaleway.com";

/// Header carrying the API secret key.
pub(crate) const AUTH_HEADER: &str = "X-Auth-Token";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Future returned by the API seam traits.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Error body returned by the Scaleway APIs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ResponseError {
    /// HTTP status code of the response.
    #[serde(skip)]
    pub status: u16,
    /// Human readable message supplied by the API.
    #[serde(default)]
    pub message: String,
    /// Machine readable error class (for example `not_found`).
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    /// Resource kind the error refers to, when the API names one.
    #[serde(default)]
    pub resource: Option<String>,
    /// Identifier of the offending resource, when the API names one.
    #[serde(default)]
    pub resource_id: Option<String>,
}

/// Errors raised by the HTTP layer.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// Raised when the request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),
    /// Raised when a success response body cannot be decoded.
    #[error("failed to decode response body: {0}")]
    Decode(String),
    /// Raised when the API answers with a non-success status.
    #[error("api error ({}): {}", .0.status, .0.message)]
    Response(ResponseError),
}

impl ApiError {
    /// Whether the error is the API's not-found answer.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Response(body) if body.status == 404)
    }

    /// Message carried by the error, regardless of variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(message) | Self::Decode(message) => message,
            Self::Response(body) => &body.message,
        }
    }
}

/// Sends the request and decodes a JSON success body.
///
/// Non-success responses are decoded into [`ResponseError`]; bodies that are
/// not the API's JSON error shape are preserved as lossy text.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ApiError> {
    let (status, body) = send_raw(request).await?;
    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()));
    }
    Err(error_from_body(status, &body))
}

/// Sends the request, discarding any success body.
pub(crate) async fn send_no_content(request: reqwest::RequestBuilder) -> Result<(), ApiError> {
    let (status, body) = send_raw(request).await?;
    if status.is_success() {
        return Ok(());
    }
    Err(error_from_body(status, &body))
}

async fn send_raw(
    request: reqwest::RequestBuilder,
) -> Result<(reqwest::StatusCode, Vec<u8>), ApiError> {
    let response = request
        .send()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    Ok((status, body.to_vec()))
}

fn error_from_body(status: reqwest::StatusCode, body: &[u8]) -> ApiError {
    let mut parsed: ResponseError = serde_json::from_slice(body).unwrap_or_else(|_| ResponseError {
        message: String::from_utf8_lossy(body).into_owned(),
        ..ResponseError::default()
    });
    parsed.status = status.as_u16();
    ApiError::Response(parsed)
}
