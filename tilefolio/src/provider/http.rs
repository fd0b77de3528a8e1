//! Tile bodies over HTTP, behind a trait so tests can serve canned bytes.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::types::ProviderError;

/// Default User-Agent string for tile requests.
///
/// Some tile servers (Google, GSI) reject requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("tilefolio/", env!("CARGO_PKG_VERSION"));

/// Default whole-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for asynchronous HTTP GET.
///
/// The renderer only ever needs the body of a tile, so this is the whole
/// surface. Tests substitute a canned implementation.
pub trait AsyncHttpClient: Send + Sync {
    /// Fetches `url` and returns the response body.
    ///
    /// Non-2xx statuses are errors.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Async HTTP client backed by reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default timeout and User-Agent.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_settings(DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT)
    }

    /// Creates a client with a custom timeout and User-Agent.
    ///
    /// A cell fans out one request per tile against a single host, so the
    /// pool keeps plenty of idle connections around.
    pub fn with_settings(timeout_secs: u64, user_agent: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .pool_max_idle_per_host(64)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, timed_out = e.is_timeout(), "Tile request failed");
            ProviderError::HttpError(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Tile server refused request");
            return Err(ProviderError::HttpError(format!("HTTP {} from {}", status, url)));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(url, error = %e, "Tile body could not be read");
            ProviderError::InvalidResponse(format!("Failed to read body of {}: {}", url, e))
        })?;

        trace!(url, bytes = body.len(), "Tile downloaded");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Canned HTTP client.
    ///
    /// Returns `response` for every URL unless `overrides` has an entry for
    /// it, and records every requested URL.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, ProviderError>,
        pub overrides: HashMap<String, Result<Vec<u8>, ProviderError>>,
        pub delay: Option<Duration>,
        pub requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockAsyncHttpClient {
        pub fn new(response: Result<Vec<u8>, ProviderError>) -> Self {
            Self {
                response,
                overrides: HashMap::new(),
                delay: None,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn with_override(
            mut self,
            url: impl Into<String>,
            response: Result<Vec<u8>, ProviderError>,
        ) -> Self {
            self.overrides.insert(url.into(), response);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
            self.requests.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.overrides
                .get(url)
                .cloned()
                .unwrap_or_else(|| self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_mock_returns_override_for_matching_url() {
        let mock = MockAsyncHttpClient::new(Ok(vec![1, 2, 3]))
            .with_override("https://t/1/0/0", Err(ProviderError::HttpError("404".into())));

        assert_eq!(mock.get("https://t/1/1/0").await.unwrap(), vec![1, 2, 3]);
        assert!(mock.get("https://t/1/0/0").await.is_err());
        assert_eq!(mock.requested().len(), 2);
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("tilefolio/"));
    }

    #[test]
    fn test_client_builds() {
        assert!(AsyncReqwestClient::with_settings(5, "test-agent").is_ok());
    }
}
