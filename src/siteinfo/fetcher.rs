//! HTTP access for the lookup engine
//!
//! [`UrlFetcher`] is the seam between crawling and the network. The reqwest
//! implementation follows a bounded number of redirects and refuses bodies
//! larger than its configured limit, since cached icon bytes live for the
//! life of the process.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, redirect::Policy};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LookupConfig;
use crate::config::defaults::DEFAULT_MAX_BODY_BYTES;
use crate::errors::{AppError, AppResult};

/// Raw reply for a fetched URL
#[derive(Debug, Clone)]
pub struct UrlResponse {
    pub status: u16,
    /// Final URL after redirects
    pub url: String,
    pub body: Bytes,
}

impl UrlResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait UrlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<UrlResponse>;
}

/// reqwest-backed fetcher used by the lookup engine
pub struct HttpUrlFetcher {
    client: Client,
    max_body_bytes: u64,
}

impl HttpUrlFetcher {
    pub fn new(timeout: Duration, max_redirects: usize, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(max_redirects))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn from_config(config: &LookupConfig) -> AppResult<Self> {
        let timeout = config
            .request_timeout()
            .map_err(|e| AppError::configuration(e.to_string()))?;
        Ok(Self::new(timeout, config.max_redirects, &config.user_agent)?
            .with_max_body_bytes(config.max_body_bytes))
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    fn oversized(&self, url: &str, size: u64) -> AppError {
        warn!(
            "Skipping {}: body of at least {} bytes exceeds the {} byte limit",
            url, size, self.max_body_bytes
        );
        AppError::lookup_failure(
            url,
            format!("response exceeds {} bytes", self.max_body_bytes),
        )
    }
}

#[async_trait]
impl UrlFetcher for HttpUrlFetcher {
    async fn fetch(&self, url: &str) -> AppResult<UrlResponse> {
        debug!("Fetching {}", url);

        let mut response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        if let Some(length) = response.content_length()
            && length > self.max_body_bytes
        {
            return Err(self.oversized(url, length));
        }

        // Content-Length may be absent or wrong, so count while streaming
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            let received = (body.len() + chunk.len()) as u64;
            if received > self.max_body_bytes {
                return Err(self.oversized(url, received));
            }
            body.extend_from_slice(&chunk);
        }
        let body = body.freeze();

        debug!("Fetched {} bytes from {} (HTTP {})", body.len(), final_url, status);

        Ok(UrlResponse {
            status,
            url: final_url,
            body,
        })
    }
}
