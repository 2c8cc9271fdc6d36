//! Signed REST dispatcher
//!
//! Resolves an [`ApiRequest`] against the configured endpoint roots, attaches
//! the identity headers and hands the call to [`HttpClient`] for retries.

use async_trait::async_trait;
use conduit_core::ports::{ApiRequest, ApiResponse, HttpMethod, RestDispatcher};
use conduit_domain::constants::{
    HEADER_SESSION_TOKEN, HEADER_SIGNATURE, HEADER_SIGNATURE_TIMESTAMP, HEADER_USER_ID,
};
use conduit_domain::{ClientConfig, ConduitError, Credentials, EndpointConfig, Result};
use reqwest::Method;
use tracing::{debug, instrument, warn};
use url::Url;

use super::signing::{sign, signature_timestamp};
use crate::errors::{reason_text, status_error, InfraError};
use crate::http::HttpClient;

/// Production [`RestDispatcher`].
///
/// Every call carries `User-Agent`. When a session token is configured it
/// goes out as `sessionToken`; when credentials are configured the request
/// is signed with `userId`, `signatureTimestamp` and `signature`.
pub struct SignedDispatcher {
    http: HttpClient,
    endpoints: EndpointConfig,
    credentials: Option<Credentials>,
    session_token: Option<String>,
}

impl SignedDispatcher {
    pub fn new(http: HttpClient, endpoints: EndpointConfig) -> Self {
        Self { http, endpoints, credentials: None, session_token: None }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = HttpClient::from_config(&config.http, config.user_agent())?;
        let mut dispatcher = Self::new(http, config.endpoints.clone());
        dispatcher.credentials = config.credentials.clone();
        dispatcher.session_token = config.session_token.clone();
        Ok(dispatcher)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Absolute URL for `request`, query string included.
    pub fn resolve_url(&self, request: &ApiRequest) -> Result<Url> {
        let root = self.endpoints.url_for(request.endpoint).trim_end_matches('/');
        let mut url = Url::parse(&format!("{root}{}", request.path)).map_err(|err| {
            ConduitError::InvalidArgument(format!("invalid URL for {}: {err}", request.path))
        })?;

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }

    /// Headers sent with `request`, after null entries are dropped.
    ///
    /// A header the request names explicitly takes precedence over the
    /// configured value, so `(sessionToken, None)` sends no session token.
    pub fn outgoing_headers(&self, request: &ApiRequest, url: &Url) -> Result<Vec<(String, String)>> {
        let named = |name: &str| request.headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name));
        let mut headers: Vec<(String, String)> = request
            .headers
            .iter()
            .filter_map(|(name, value)| value.clone().map(|value| (name.clone(), value)))
            .collect();

        if let Some(token) = &self.session_token {
            if !named(HEADER_SESSION_TOKEN) {
                headers.push((HEADER_SESSION_TOKEN.to_string(), token.clone()));
            }
        }

        if let Some(credentials) = &self.credentials {
            let timestamp = signature_timestamp(chrono::Utc::now());
            let signature =
                sign(&credentials.user_name, &credentials.api_key, url.path(), &timestamp)?;
            headers.push((HEADER_USER_ID.to_string(), credentials.user_name.clone()));
            headers.push((HEADER_SIGNATURE_TIMESTAMP.to_string(), timestamp));
            headers.push((HEADER_SIGNATURE.to_string(), signature));
        }

        Ok(headers)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl RestDispatcher for SignedDispatcher {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.resolve_url(&request)?;
        let headers = self.outgoing_headers(&request, &url)?;

        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), url)
            .header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await?;
        let status = response.status();
        let body = response.text().await.map_err(|err| ConduitError::from(InfraError::from(err)))?;

        if status.is_success() {
            debug!(status = status.as_u16(), bytes = body.len(), "dispatch succeeded");
            return Ok(ApiResponse::new(status.as_u16(), body));
        }

        let reason = reason_text(&body, status.canonical_reason().unwrap_or("unknown status"));
        warn!(status = status.as_u16(), %reason, "dispatch rejected");
        Err(status_error(status.as_u16(), reason))
    }
}
