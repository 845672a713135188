//! HTML page fetcher shared by the bulletin and review crawls.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::{retry_fixed, Pacer};

/// HTTP client for the scraped sources.
///
/// Every request waits for the politeness gap since the previous one, and
/// transient failures (network errors, 429, 5xx) are retried after a fixed
/// delay up to `max_retries` times.
#[derive(Debug)]
pub struct PageFetcher {
    client: Client,
    pacer: Pacer,
    max_retries: u32,
    retry_delay: Duration,
}

impl PageFetcher {
    /// Creates a fetcher with the given timeout, `User-Agent`, politeness
    /// gap and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        inter_request_delay: Duration,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            pacer: Pacer::new(inter_request_delay),
            max_retries,
            retry_delay,
        })
    }

    /// Builds a fetcher from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &gmdb_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            Duration::from_millis(config.scraper_inter_request_delay_ms),
            config.scraper_max_retries,
            Duration::from_secs(config.scraper_retry_delay_secs),
        )
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] on 404 (not retried).
    /// - [`ScraperError::RateLimited`] on 429 after retries.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status (5xx retried).
    /// - [`ScraperError::Http`] on network failure after retries.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        retry_fixed(self.max_retries, self.retry_delay, || async move {
            self.pacer.wait_turn().await;
            tracing::debug!(url, "fetching page");

            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited {
                    url: url.to_owned(),
                    retry_after_secs,
                });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    url: url.to_owned(),
                });
            }

            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }
}

/// Resolves `href` (absolute or relative) against `base`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `base` is not a URL or `href`
/// cannot be joined onto it.
pub fn resolve_url(base: &str, href: &str) -> Result<String, ScraperError> {
    let base_url = reqwest::Url::parse(base).map_err(|e| ScraperError::InvalidUrl {
        url: base.to_owned(),
        reason: e.to_string(),
    })?;
    base_url
        .join(href)
        .map(String::from)
        .map_err(|e| ScraperError::InvalidUrl {
            url: href.to_owned(),
            reason: e.to_string(),
        })
}
