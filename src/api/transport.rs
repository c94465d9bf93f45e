//! Network layer for the forum API
//!
//! `Transport` is the single primitive the rest of the client talks to: send
//! one request, get back the decoded JSON body or an `ApiError`. It does not
//! retry and knows nothing about caching. `HttpTransport` implements it over
//! reqwest.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::error::{ApiError, CONNECTION_ERROR_MESSAGE, DEFAULT_ERROR_MESSAGE};

/// Base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// HTTP methods used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single API call
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    /// Path and query string, appended to the base URL
    pub endpoint: &'a str,
    pub method: Method,
    /// JSON body, sent with a JSON content type when present
    pub body: Option<Value>,
    /// Bearer token for the `Authorization` header
    pub token: Option<&'a str>,
}

/// Performs API calls
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response body
    ///
    /// A `204 No Content` response yields `Value::Null`.
    async fn send(&self, request: ApiRequest<'_>) -> Result<Value, ApiError>;
}

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Transport over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl HttpTransport {
    /// Creates a transport for the API at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Extracts a human-readable message from a failed response
    async fn error_message(response: reqwest::Response) -> String {
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .and_then(|detail| match detail {
                Value::String(message) => Some(message),
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest<'_>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, request.endpoint);
        debug!(method = request.method.as_str(), %url, "sending request");

        let mut builder = self.http_client.request(request.method.into(), &url);
        if let Some(token) = request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                ApiError::Connection(CONNECTION_ERROR_MESSAGE.to_string())
            } else {
                ApiError::HttpError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://localhost:8000/");
        assert_eq!(transport.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[tokio::test]
    async fn test_unreachable_server_maps_to_connection_error() {
        // Port 9 (discard) is closed on test machines
        let transport = HttpTransport::new("http://127.0.0.1:9");

        let result = transport
            .send(ApiRequest {
                endpoint: "/homepage/",
                method: Method::Get,
                body: None,
                token: None,
            })
            .await;

        assert!(matches!(result, Err(ApiError::Connection(_))));
    }
}
