// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub mod throttle;

pub use throttle::Throttle;

/// Retrieves document text for a URL.
///
/// A non-success response is an `Err`; a successful empty body is `Ok("")`.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn get_text(&self, url: &Url) -> Result<String>;
}

/// `reqwest`-backed fetcher that spaces requests by a minimum interval.
pub struct HttpFetcher {
    client: Client,
    throttle: Throttle,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, min_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("building HTTP client")?;
        Ok(Self::with_client(client, min_interval))
    }

    pub fn with_client(client: Client, min_interval: Duration) -> Self {
        Self {
            client,
            throttle: Throttle::new(min_interval),
        }
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(url = %url))]
    async fn get_text(&self, url: &Url) -> Result<String> {
        self.throttle.wait().await;
        debug!("Fetching text from {}", url);
        let text = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))?;
        debug!(bytes = text.len(), "fetched");
        Ok(text)
    }
}
