//! Byte transfer to presigned storage URLs

use async_trait::async_trait;
use conduit_core::ports::PartTransfer;
use conduit_domain::{HttpConfig, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tracing::debug;

use crate::errors::status_error;
use crate::http::HttpClient;

/// Plain PUT with `Content-Type` as its only header.
///
/// Presigned URLs are signed over their headers, so this client carries no
/// user agent and no identity headers, and makes a single attempt. Part
/// retries belong to the chunk worker, which fetches a fresh URL each time.
///
/// The wire request still has `host` and `content-length`, plus reqwest's
/// built-in `accept: */*`, which its client builder cannot drop. None of
/// them is part of a presigned signature.
pub struct PresignedTransfer {
    http: HttpClient,
}

impl PresignedTransfer {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout()).max_attempts(1).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PartTransfer for PresignedTransfer {
    async fn put_part(&self, url: &str, content_type: &str, bytes: &[u8]) -> Result<()> {
        let builder = self
            .http
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec());

        let response = self.http.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), bytes = bytes.len(), "part stored");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let reason = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("transfer rejected").to_string()
        } else {
            body.trim().to_string()
        };
        Err(status_error(status.as_u16(), reason))
    }
}
