use crate::address::Address;
use crate::error::{Result, ScanError};
use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Retrieves the text content reachable at an address.
///
/// Implementations make a single attempt; a failure is reported, never retried.
pub trait Fetcher {
    fn fetch(&self, address: &Address) -> impl Future<Output = Result<String>> + Send;
}

pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pagewalk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn parse_http_url(address: &Address) -> Result<Url> {
        let url = Url::parse(address.as_str())
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", address, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ScanError::UnsupportedScheme {
                url: address.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &Address) -> Result<String> {
        let url = Self::parse_http_url(address)?;
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Err(ScanError::Status {
                url: address.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(
            "Fetched {} ({} bytes, {:?})",
            address,
            body.len(),
            start.elapsed()
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html><body>Hello</body></html>"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let address = Address::new(format!("{}/page", mock_server.uri()));
        let body = fetcher.fetch(&address).await.unwrap();

        assert!(body.contains("Hello"));
    }

    #[tokio::test]
    async fn test_fetch_fails_on_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/dead"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let address = Address::new(format!("{}/dead", mock_server.uri()));
        let err = fetcher.fetch(&address).await.unwrap_err();

        assert!(matches!(err, ScanError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_fails_on_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let address = Address::new(format!("{}/boom", mock_server.uri()));
        let err = fetcher.fetch(&address).await.unwrap_err();

        assert!(matches!(err, ScanError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let address = Address::new(format!("{}/old", mock_server.uri()));
        let body = fetcher.fetch(&address).await.unwrap();

        assert_eq!(body, "moved here");
    }

    #[tokio::test]
    async fn test_fetch_rejects_contact_scheme() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&Address::from("mailto:x@y.test"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::UnsupportedScheme { ref scheme, .. } if scheme == "mailto"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_relative_address() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&Address::from("/just/a/path"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::InvalidUrl(_)));
    }

    #[test]
    fn test_default_timeout() {
        let fetcher = HttpFetcher::new().unwrap();
        assert_eq!(fetcher.timeout_secs(), 10);
    }
}
