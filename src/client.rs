//! HTTP page fetching using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::error::{HarvestError, Result};
use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;
use wreq::Client;
use wreq_util::Emulation;

/// Trait for fetching page bodies - enables mocking for tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issues a single GET and returns the body of a 2xx response.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher with browser impersonation and a fixed request timeout.
pub struct HttpFetcher {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl HttpFetcher {
    /// Creates a fetcher from the resolved configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_timeout(config, config.fetch_timeout())
    }

    /// Creates a fetcher with an explicit timeout (sub-second timeouts for tests).
    pub fn with_timeout(config: &Config, timeout: Duration) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, delay_ms: config.delay_ms, delay_jitter_ms: config.delay_jitter_ms })
    }

    /// Adds a random delay to mimic human behavior.
    async fn delay(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    fn transport_error(url: &str, error: wreq::Error) -> HarvestError {
        if error.is_timeout() {
            HarvestError::FetchTimeout { url: url.to_string() }
        } else {
            HarvestError::Fetch { url: url.to_string(), reason: error.to_string() }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "es-AR,es;q=0.9,en;q=0.8")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| Self::transport_error(url, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(HarvestError::FetchStatus { url: url.to_string(), status: status.as_u16() });
        }

        response.text().await.map_err(|e| Self::transport_error(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::with_timeout(&Config::default(), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/category/cat1/Mesas"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>mesas</html>"))
            .mount(&mock_server)
            .await;

        let fetcher = make_fetcher(Duration::from_secs(5));
        let url = format!("{}/category/cat1/Mesas", mock_server.uri());

        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(body, "<html>mesas</html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = make_fetcher(Duration::from_secs(5));
        let url = format!("{}/missing", mock_server.uri());

        match fetcher.fetch(&url).await.unwrap_err() {
            HarvestError::FetchStatus { status, url: failed } => {
                assert_eq!(status, 404);
                assert_eq!(failed, url);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = make_fetcher(Duration::from_secs(5));
        let err = fetcher.fetch(&format!("{}/boom", mock_server.uri())).await.unwrap_err();
        assert!(matches!(err, HarvestError::FetchStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = make_fetcher(Duration::from_millis(200));
        let err = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await.unwrap_err();
        assert!(matches!(err, HarvestError::FetchTimeout { .. }), "got {err}");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = make_fetcher(Duration::from_secs(2));
        let err = fetcher.fetch("http://127.0.0.1:1/nothing").await.unwrap_err();
        assert!(err.is_fetch_failure());
    }
}
