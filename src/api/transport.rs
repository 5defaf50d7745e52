//! Raw request/response plumbing to the finance API.
//!
//! [`Transport`] is the seam between typed API calls and the network. The
//! production implementation is [`HttpTransport`] (reqwest); tests plug in an
//! in-memory implementation that records what was sent.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::api::types::ErrorBody;
use crate::error::FetchError;

/// HTTP verbs used by the finance API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A single call to the finance API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path, e.g. `/api/finance/budgets`.
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

/// Sends requests to the finance API and returns the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `request`. Non-success statuses map to [`FetchError::Api`];
    /// an empty body yields `Value::Null`.
    async fn send(&self, request: ApiRequest) -> Result<Value, FetchError>;
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - finance API origin, e.g. `http://127.0.0.1:8080`
    /// * `timeout` - applied to every request
    /// * `bearer_token` - sent as `Authorization: Bearer ...` when present
    pub fn new(
        base_url: &str,
        timeout: Duration,
        bearer_token: Option<&str>,
    ) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::Network(format!("invalid base URL: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = bearer_token.filter(|t| !t.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FetchError::Network(format!("invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::Network(format!("invalid path {path}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, FetchError> {
        let url = self.url(&request.path)?;
        tracing::debug!(
            name: "finance_api.request",
            method = %request.method,
            path = %request.path,
            "Calling finance API"
        );

        let mut builder = self.http.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).trim().to_string());
            tracing::warn!(
                name: "finance_api.error",
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                error = %message,
                "Finance API returned an error"
            );
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_against_base() {
        let t = HttpTransport::new("http://localhost:8080", Duration::from_secs(1), None).unwrap();
        assert_eq!(
            t.url("/api/finance/summary").unwrap().as_str(),
            "http://localhost:8080/api/finance/summary"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = HttpTransport::new("not a url", Duration::from_secs(1), None).unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        // Port 9 (discard) is closed on test machines.
        let t = HttpTransport::new("http://127.0.0.1:9", Duration::from_secs(2), None).unwrap();
        let err = t.send(ApiRequest::get("/api/finance/summary")).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_) | FetchError::Timeout));
    }
}
