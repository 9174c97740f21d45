//! Shared HTTP client for page and API fetches.
//!
//! Features:
//! - HTTP/2 with connection pooling and keep-alive
//! - TLS 1.3 via rustls
//! - Brotli, Zstd, Gzip compression (auto-negotiated)
//!
//! One client is built per process and cloned into each extractor; clones
//! share the underlying connection pool.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::error::ExtractError;

const USER_AGENT: &str = concat!("radiograb/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper shared by all extractors.
#[derive(Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    pub fn new() -> Result<Self, ExtractError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            // Keep connections alive across the page fetch and the API call
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a webpage and return its body as text.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, ExtractError> {
        debug!("fetching page");
        let response = self.client.get(url).send().await?;

        info!(
            status = %response.status(),
            version = ?response.version(),
            "response received"
        );

        Ok(response.text().await?)
    }

    /// GET a JSON API endpoint and deserialize the response.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ExtractError> {
        debug!("fetching JSON");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Get the underlying reqwest client for requests needing custom
    /// methods or headers.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new().expect("Failed to create default client")
    }
}
