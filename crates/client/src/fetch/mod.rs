//! HTTP fetch pipeline behind the cache worker.
//!
//! Unlike a general-purpose client, this one never turns an HTTP error
//! status into an `Err`: the strategy executors need non-2xx responses
//! passed through to the caller. `Err` means a transport-level failure
//! (offline, DNS, refused, timeout), which is exactly the condition the
//! cache fallback paths key off.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::{Duration, Instant};

use umbra_core::{Error, Method, Request, StoredResponse};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "umbra/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "umbra/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20_000),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub final_url: ::url::Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// HTTP status in the "ok" range; only these are ever cached.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<FetchResponse> for StoredResponse {
    fn from(resp: FetchResponse) -> Self {
        StoredResponse::new(resp.status, resp.headers, resp.bytes)
    }
}

/// The network seam the worker dispatches through.
///
/// The worker only ever sees this trait, so tests can substitute a mock
/// network and count or fail fetches deterministically.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform the request against the real network.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures; HTTP error
    /// statuses come back as `Ok` responses.
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error>;
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn method_for(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

#[async_trait]
impl Fetch for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut builder = self
            .http
            .request(Self::method_for(request.method), request.url.clone());

        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(e.to_string())
            } else {
                Error::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            url = %request.url,
            final_url = %final_url,
            status,
            fetch_ms,
            bytes = bytes.len(),
            "fetch complete"
        );

        Ok(FetchResponse { final_url, status, headers, bytes, fetch_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "umbra/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20_000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_fetch_response_is_ok_range() {
        let mut resp = FetchResponse {
            final_url: ::url::Url::parse("https://example.com").unwrap(),
            status: 200,
            headers: vec![],
            bytes: Bytes::new(),
            fetch_ms: 1,
        };
        assert!(resp.is_ok());
        resp.status = 299;
        assert!(resp.is_ok());
        resp.status = 304;
        assert!(!resp.is_ok());
        resp.status = 503;
        assert!(!resp.is_ok());
    }

    #[test]
    fn test_fetch_response_into_stored() {
        let resp = FetchResponse {
            final_url: ::url::Url::parse("https://example.com").unwrap(),
            status: 200,
            headers: vec![("content-type".into(), "text/html".into())],
            bytes: Bytes::from_static(b"<html>"),
            fetch_ms: 12,
        };
        let stored: StoredResponse = resp.into();
        assert_eq!(stored.status, 200);
        assert_eq!(stored.body, Bytes::from_static(b"<html>"));
        assert_eq!(stored.header("content-type"), Some("text/html"));
    }
}
