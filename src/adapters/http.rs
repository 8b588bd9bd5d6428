//! reqwest-backed page fetcher with a short timeout and a bounded retry.

use crate::domain::ports::{ConfigProvider, PageFetcher};
use crate::utils::error::{FeedError, Result};
use reqwest::Client;
use std::time::Duration;

const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry_attempts: u32,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration, retry_attempts: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self {
            client,
            retry_attempts,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.user_agent(),
            Duration::from_secs(config.timeout_seconds()),
            config.retry_attempts(),
        )
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        tracing::debug!("GET {} -> {}", url, response.status());
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Timeouts, connection failures and 5xx answers may succeed on a second try.
fn is_retryable(error: &FeedError) -> bool {
    match error {
        FeedError::HttpError(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|status| status.is_server_error())
        }
        _ => false,
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retry_attempts && is_retryable(&e) => {
                    attempt += 1;
                    let delay = Duration::from_millis(BACKOFF_BASE_MS * 2u64.pow(attempt - 1));
                    tracing::warn!(
                        "Retrying {} in {:?} (attempt {}/{}): {}",
                        url,
                        delay,
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
