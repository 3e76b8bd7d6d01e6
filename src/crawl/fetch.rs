use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::util::retry::RetryPolicy;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
const API_TIMEOUT: Duration = Duration::from_secs(10);
const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed after {attempts} attempts: {source}")]
    RetriesExhausted { attempts: u32, source: reqwest::Error },
}

/// Release object returned by the source-control hosting REST API.
#[derive(Debug, Deserialize)]
pub struct ReleaseInfo {
    pub published_at: String,
    pub tag_name: String,
    pub body: Option<String>,
}

/// Shared HTTP client for page fetches and the bespoke release API.
pub struct PageClient {
    http: Client,
    retry: RetryPolicy,
    api_base: String,
    api_token: Option<String>,
}

impl PageClient {
    pub fn new(retry: RetryPolicy) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(PAGE_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            retry,
            api_base: GITHUB_API_BASE.to_string(),
            api_token: std::env::var("GITHUB_TOKEN").ok(),
        })
    }

    /// Point the release API at a different base URL (tests, GH Enterprise).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Fetch a page body, retrying network and HTTP-status failures with
    /// randomized backoff until the retry budget is exhausted.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut attempts = 0u32;
        loop {
            tokio::time::sleep(self.retry.courtesy_delay()).await;
            match self.try_get(url).await {
                Ok(body) => return Ok(body),
                Err(source) => {
                    attempts += 1;
                    tracing::warn!(url, attempts, error = %source, "fetch attempt failed");
                    if !self.retry.should_retry(attempts) {
                        return Err(FetchError::RetriesExhausted { attempts, source });
                    }
                    tokio::time::sleep(self.retry.backoff_delay()).await;
                }
            }
        }
    }

    async fn try_get(&self, url: &str) -> Result<String, reqwest::Error> {
        let resp = self.http.get(url).send().await?.error_for_status()?;
        resp.text().await
    }

    /// Single-shot fetch of a release object from the hosting REST API.
    /// Failures here are not retried; the caller falls back to the HTML path.
    pub async fn fetch_release_api(&self, repo: &str, tag: &str) -> Result<ReleaseInfo, FetchError> {
        let url = format!("{}/repos/{}/releases/tags/{}", self.api_base, repo, tag);
        let mut req = self.http.get(&url).timeout(API_TIMEOUT);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let release = req
            .send()
            .await?
            .error_for_status()?
            .json::<ReleaseInfo>()
            .await?;
        Ok(release)
    }
}
