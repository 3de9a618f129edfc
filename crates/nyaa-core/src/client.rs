//! HTTP client with rate limiting and retry logic for nyaa.si
//!
//! nyaa.si enforces informal rate limits and answers abusive clients
//! with HTTP 429, so all requests go through a rate limiter and
//! transient failures are retried with exponential backoff.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::category::UnknownCategoryPolicy;
use crate::error::{NyaaError, Result};
use crate::url::DEFAULT_BASE_URL;

const USER_AGENT: &str = concat!("nyaa-core/", env!("CARGO_PKG_VERSION"));

/// Configuration for the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the site (default: `https://nyaa.si/`)
    pub base_url: String,
    /// Maximum requests per second (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Maximum retry attempts for transient errors (default: 3)
    pub max_retries: u32,
    /// Behavior on an unrecognized category string (default: fail)
    pub unknown_category: UnknownCategoryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_second: 2.0,
            timeout_secs: 30,
            max_retries: 3,
            unknown_category: UnknownCategoryPolicy::default(),
        }
    }
}

/// Spaces requests out so at most `requests_per_second` hit the site.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = Duration::from_secs_f64(1.0 / requests_per_second);
        Self {
            min_interval,
            // Backdated so the first acquire never waits
            last_request: Mutex::new(Instant::now() - min_interval),
        }
    }

    /// Wait for the next request slot.
    ///
    /// Sleeps off whatever remains of the interval since the previous
    /// request, then claims the slot. Concurrent callers queue on the
    /// mutex, so requests stay serialized.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(remaining) = self.min_interval.checked_sub(last.elapsed()) {
            sleep(remaining).await;
        }

        *last = Instant::now();
    }

    /// Minimum spacing between two requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// HTTP layer for nyaa.si
///
/// Exposes text (pages) and byte (`.torrent` files) GETs with:
/// - rate limiting to stay under the site's informal limits
/// - automatic retries with exponential backoff for 429/5xx
/// - typed status mapping: 404 becomes [`NyaaError::NotFound`], any
///   other non-success status becomes [`NyaaError::Status`]
pub struct NyaaClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    max_retries: u32,
}

impl NyaaClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(NyaaError::Http)?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            max_retries: config.max_retries,
        })
    }

    /// Fetch a page as text
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get_with_retry(url).await?;
        response.text().await.map_err(NyaaError::Http)
    }

    /// Fetch a binary resource (a `.torrent` file)
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get_with_retry(url).await?;
        let bytes = response.bytes().await.map_err(NyaaError::Http)?;
        Ok(bytes.to_vec())
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempt = 0;

        loop {
            self.rate_limiter.acquire().await;

            match self.do_get(url).await {
                Ok(response) => return Ok(response),
                Err(e) if Self::is_retryable(&e) && attempt < self.max_retries => {
                    // Exponential backoff: 1s, 2s, 4s
                    let backoff = Duration::from_secs(1 << attempt);
                    warn!(url, attempt, error = %e, "retrying after transient error");
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn do_get(&self, url: &str) -> Result<reqwest::Response> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(NyaaError::Http)?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(NyaaError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(NyaaError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            return Err(NyaaError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    fn is_retryable(error: &NyaaError) -> bool {
        match error {
            NyaaError::RateLimited => true,
            NyaaError::Status { status, .. } => *status >= 500,
            NyaaError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Get a reference to the rate limiter (for testing)
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> ClientConfig {
        ClientConfig {
            requests_per_second: 500.0,
            max_retries: 0,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_rate_limiter_interval_from_rate() {
        assert_eq!(
            RateLimiter::new(2.0).min_interval(),
            Duration::from_millis(500)
        );
        assert_eq!(
            RateLimiter::new(4.0).min_interval(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://nyaa.si/");
        assert_eq!(config.requests_per_second, 2.0);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.unknown_category, UnknownCategoryPolicy::Fail);
    }

    #[test]
    fn test_client_creation() {
        assert!(NyaaClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_consecutive_acquires() {
        // 100ms interval; the first acquire is free, the second sleeps
        let limiter = RateLimiter::new(10.0);

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;

        // Small tolerance for timer jitter
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_get_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/view/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = NyaaClient::with_config(&fast_config()).unwrap();
        let body = client.get_text(&format!("{}/view/1", server.uri())).await.unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_404_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = NyaaClient::with_config(&fast_config()).unwrap();
        let result = client.get_text(&format!("{}/view/999", server.uri())).await;
        assert!(matches!(result, Err(NyaaError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_other_status_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = NyaaClient::with_config(&fast_config()).unwrap();
        let result = client.get_text(&format!("{}/view/1", server.uri())).await;
        assert!(matches!(
            result,
            Err(NyaaError::Status { status: 503, .. })
        ));
    }
}
