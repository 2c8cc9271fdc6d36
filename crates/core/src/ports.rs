//! Port interfaces the engine drives
//!
//! Infrastructure supplies the implementations; tests supply in-memory ones.

use async_trait::async_trait;
use conduit_domain::{ConduitError, Endpoint, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// One logical REST call, before signing.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub method: HttpMethod,
    /// Path below the endpoint root, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// A `None` value marks a header explicitly set to null; it is stripped.
    pub headers: Vec<(String, Option<String>)>,
}

impl ApiRequest {
    pub fn new(endpoint: Endpoint, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            endpoint,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: Endpoint, path: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Get, path)
    }

    pub fn post(endpoint: Endpoint, path: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Post, path)
    }

    pub fn put(endpoint: Endpoint, path: impl Into<String>) -> Self {
        Self::new(endpoint, HttpMethod::Put, path)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn with_json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.headers.push((name.into(), value));
        self
    }

    /// First query value for `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// A 2xx response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            ConduitError::Serialization(format!("unexpected response body: {err}"))
        })
    }
}

/// Sends one signed request, retrying transient failures.
///
/// Non-2xx outcomes come back as `Err`, never as an `ApiResponse`.
#[async_trait]
pub trait RestDispatcher: Send + Sync {
    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Raw byte PUT to a presigned URL, carrying only `Content-Type`.
#[async_trait]
pub trait PartTransfer: Send + Sync {
    async fn put_part(&self, url: &str, content_type: &str, bytes: &[u8]) -> Result<()>;
}

/// Random-access byte source for an upload.
#[async_trait]
pub trait UploadSource: Send + Sync {
    fn file_name(&self) -> &str;

    fn size(&self) -> u64;

    /// Read exactly `len` bytes starting at `offset`.
    async fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>>;
}
