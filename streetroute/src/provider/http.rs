//! HTTP client abstraction for testability

use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::types::ProviderError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent string for HTTP requests.
const DEFAULT_USER_AGENT: &str = concat!("streetroute/", env!("CARGO_PKG_VERSION"));

/// Replace the value of a `key` query parameter so locators can be logged.
pub fn redact_locator(url: &str) -> Cow<'_, str> {
    let start = ["?key=", "&key="]
        .iter()
        .filter_map(|param| url.find(param).map(|i| i + param.len()))
        .min();
    let Some(start) = start else {
        return Cow::Borrowed(url);
    };
    let end = url[start..].find('&').map_or(url.len(), |i| start + i);
    Cow::Owned(format!("{}REDACTED{}", &url[..start], &url[end..]))
}

/// Trait for asynchronous HTTP client operations.
///
/// Allows mock clients to be injected in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request and returns the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let logged = redact_locator(url);
        trace!(url = %logged, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = %logged,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                let e = e.without_url();
                warn!(
                    url = %logged,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(ProviderError::HttpError(format!(
                    "Request failed: {}",
                    e
                )));
            }
        };

        if !response.status().is_success() {
            warn!(
                url = %logged,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(ProviderError::HttpError(format!(
                "HTTP {} from {}",
                response.status(),
                logged
            )));
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = %logged, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = %logged, error = %e, "Failed to read response body");
                Err(ProviderError::HttpError(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock async HTTP client for testing.
    ///
    /// Counts requests and records requested URLs. An optional delay keeps a
    /// request in flight long enough to observe concurrent behavior.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, ProviderError>,
        pub delay: Option<Duration>,
        calls: Arc<AtomicUsize>,
        urls: Arc<parking_lot::Mutex<Vec<String>>>,
    }

    impl MockAsyncHttpClient {
        pub fn new(response: Result<Vec<u8>, ProviderError>) -> Self {
            Self {
                response,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
                urls: Arc::new(parking_lot::Mutex::new(Vec::new())),
            }
        }

        pub fn ok(body: &[u8]) -> Self {
            Self::new(Ok(body.to_vec()))
        }

        pub fn failing(message: &str) -> Self {
            Self::new(Err(ProviderError::HttpError(message.to_string())))
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().clone()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockAsyncHttpClient::ok(&[1, 2, 3, 4]);

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.urls(), vec!["http://example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockAsyncHttpClient::failing("Test error");

        let result = mock.get("http://example.com").await;
        assert!(matches!(result, Err(ProviderError::HttpError(_))));
    }

    #[test]
    fn test_redact_locator() {
        assert_eq!(
            redact_locator("https://host/sv?size=640x640&key=AIzaSecret&fov=90"),
            "https://host/sv?size=640x640&key=REDACTED&fov=90"
        );
        assert_eq!(
            redact_locator("https://host/sv?key=AIzaSecret"),
            "https://host/sv?key=REDACTED"
        );
        assert_eq!(
            redact_locator("https://host/sv?monkey=1"),
            "https://host/sv?monkey=1"
        );
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::with_timeout(5).is_ok());
    }
}
