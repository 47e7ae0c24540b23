//! Directory listing retrieval.
//!
//! [`ListingFetcher`] is the seam between the poller and the network.
//! [`HttpListingFetcher`] is the production implementation; tests supply
//! their own.

use std::future::Future;
use std::time::Duration;

use crate::domain::ServerListing;
use crate::error::TrackerError;

/// User agent sent with directory requests.
const USER_AGENT: &str = concat!("minestalker/", env!("CARGO_PKG_VERSION"));

/// Source of directory listings.
pub trait ListingFetcher: std::fmt::Debug + Send + Sync {
    /// Retrieves the current listing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::FetchError`] if the listing cannot be
    /// retrieved or parsed.
    fn fetch(&self) -> impl Future<Output = Result<ServerListing, TrackerError>> + Send;
}

/// Fetches the listing over HTTP with a shared, pooled client.
#[derive(Debug, Clone)]
pub struct HttpListingFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpListingFetcher {
    /// Creates a fetcher for `url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::FetchError`] if the HTTP client cannot be
    /// built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TrackerError::FetchError(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ListingFetcher for HttpListingFetcher {
    async fn fetch(&self) -> Result<ServerListing, TrackerError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TrackerError::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::FetchError(format!(
                "directory returned status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TrackerError::FetchError(e.to_string()))?;
        decode_listing(&body)
    }
}

/// Parses a directory response body.
///
/// # Errors
///
/// Returns [`TrackerError::FetchError`] if `body` is not a listing object.
/// Individual entries that fail to decode are skipped.
pub fn decode_listing(body: &[u8]) -> Result<ServerListing, TrackerError> {
    serde_json::from_slice(body)
        .map_err(|e| TrackerError::FetchError(format!("malformed listing: {e}")))
}
