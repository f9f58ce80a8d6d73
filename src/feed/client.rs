use serde_json::Value;
use std::time::Duration;

use crate::config::FeedConfig;

use super::error::FeedError;
use super::hour::HourCode;

/// Client for the hourly snapshot feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retries: u32,
    retry_backoff: Duration,
}

impl FeedClient {
    pub fn new(client: reqwest::Client, config: &FeedConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            retries: config.retries,
            retry_backoff: config.retry_backoff,
        }
    }

    pub fn url_for(&self, hour: HourCode) -> String {
        format!("{}/{}.json", self.base_url, hour)
    }

    /// Fetch and decode one hour's snapshot.
    ///
    /// Failures are logged and reported as `None` so one bad hour never
    /// aborts an aggregation.
    pub async fn fetch(&self, hour: HourCode) -> Option<Value> {
        let url = self.url_for(hour);
        let result = self
            .fetch_with_retry(&url)
            .await
            .and_then(|body| decode_payload(&body));

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Failed to fetch {}: {}", url, e);
                None
            }
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String, FeedError> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retries => {
                    let delay = self.retry_backoff.saturating_mul(1u32 << attempt.min(16));
                    attempt += 1;
                    log::debug!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        attempt,
                        url,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FeedError> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Parse a feed body, unwrapping one level of string encoding.
///
/// A body such as `"{\"lat\":1}"` is a JSON string holding the document;
/// it is parsed a second time. Deeper encodings are left as strings.
pub fn decode_payload(body: &str) -> Result<Value, FeedError> {
    match serde_json::from_str::<Value>(body)? {
        Value::String(inner) => Ok(serde_json::from_str(&inner)?),
        other => Ok(other),
    }
}
