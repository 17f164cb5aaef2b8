//! Page fetching.
//!
//! A failed fetch is never an error for the caller: non-2xx responses,
//! transport failures and timeouts are logged and reported as `None`, so the
//! driver records zero articles for that source and moves on.

use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::BoxError;

/// Anything that can turn a URL into page markup.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// [`PageFetcher`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with a fixed timeout and a browser-like user agent.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, BoxError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Option<String> {
        let response = match self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "Fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Source returned non-success status");
            return None;
        }

        match response.text().await {
            Ok(body) => {
                info!(bytes = body.len(), "Fetched page");
                debug!(preview = %crate::utils::truncate_for_log(&body, 200), "Page body");
                Some(body)
            }
            Err(e) => {
                warn!(error = %e, "Failed to read response body");
                None
            }
        }
    }
}
