//! Image retrieval: an [`HttpClient`] seam, a pooled reqwest client and a
//! retrying fetcher keyed by [`ForecastIndex`].

mod basic;
mod client;
mod retry;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use retry::{BACKOFF_MAX, RetryPolicy};

use reqwest::Method;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::FetchError;
use crate::forecast::{ForecastIndex, image_url};

/// Issues one request and returns the body of a successful response.
///
/// Non-2xx statuses become [`FetchError::Status`], flagged retryable when
/// the status is one the [`RetryPolicy`] replays.
pub async fn fetch_once<C: HttpClient + ?Sized>(
    client: &C,
    method: Method,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    let url = reqwest::Url::parse(url).map_err(|e| FetchError::Url(e.to_string()))?;
    let req = reqwest::Request::new(method, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            retryable: RetryPolicy::is_retryable_status(status),
        });
    }

    Ok(resp.bytes().await?.to_vec())
}

/// GETs `url`, retrying transport failures and retryable statuses with backoff.
pub async fn fetch_with_retry<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, FetchError> {
    let max_attempts = policy.attempts_for(&Method::GET);
    let mut attempt = 1;

    loop {
        match fetch_once(client, Method::GET, url).await {
            Ok(bytes) => {
                debug!(url, attempt, bytes = bytes.len(), "Image fetched");
                return Ok(bytes);
            }
            Err(e) if e.is_retryable() => {
                if attempt >= max_attempts {
                    return Err(FetchError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                let delay = policy.delay_after(attempt);
                warn!(
                    url,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retryable fetch failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fetches forecast images by index through a shared client and retry policy.
pub struct ImageFetcher<C> {
    client: C,
    policy: RetryPolicy,
    base_url: String,
}

impl<C: HttpClient> ImageFetcher<C> {
    pub fn new(client: C, policy: RetryPolicy, base_url: impl Into<String>) -> Self {
        Self {
            client,
            policy,
            base_url: base_url.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn url_for(&self, index: ForecastIndex) -> String {
        image_url(&self.base_url, index)
    }

    /// Fetches the image bytes for `index`.
    pub async fn fetch(&self, index: ForecastIndex) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(index);
        fetch_with_retry(&self.client, &url, &self.policy).await
    }

    /// Fetches an arbitrary URL under the same retry policy.
    pub async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        fetch_with_retry(&self.client, url, &self.policy).await
    }
}

impl ImageFetcher<BasicClient> {
    /// Builds the client and policy for one pipeline invocation.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, FetchError> {
        let client = BasicClient::from_config(config)?;
        Ok(Self::new(
            client,
            RetryPolicy::from_config(config),
            config.base_url.clone(),
        ))
    }
}
