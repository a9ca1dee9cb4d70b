use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Client identifier sent with every competitor-page request.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; ContentBriefBot/1.0)";

/// Seam over page retrieval so the pipeline can run against a fake.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the HTML document behind `url`. Errors here are routine,
    /// competitor sites block automated fetches all the time, and the
    /// caller absorbs them into a placeholder signal.
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Page request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Non-success status {status}");
        }

        let body = resp.text().await.context("Failed to read page body")?;
        debug!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
