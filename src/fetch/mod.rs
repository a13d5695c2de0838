//! HTTP fetching of structured API resources.
//!
//! A [`Route`] names one endpoint (method, base URL, path, headers). The
//! [`Fetch`] trait issues a single request for it and returns the parsed
//! JSON body; [`fetch_typed`] decodes that body into a typed resource so
//! missing fields fail at the boundary instead of deep in business logic.
//! There are no retries: one failed request is reported to the caller.

pub mod ladder;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub use ladder::LadderApi;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Got an unsuccessful response code: {status}, from {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("Unexpected response shape from {url}: {source}")]
    Schema {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Status code carried by an upstream status failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One request against an API endpoint.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub base_url: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl Route {
    pub fn new(method: Method, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            path: path.into(),
            headers: Vec::new(),
        }
    }

    pub fn get(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::GET, base_url, path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    /// Full URL: base and path concatenated with exactly one separating slash.
    pub fn url(&self) -> Result<Url, FetchError> {
        let base = self.base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        let joined = format!("{}/{}", base, path);
        Url::parse(&joined).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    fn header_map(&self) -> Result<HeaderMap, FetchError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::InvalidHeader(format!("name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::InvalidHeader(format!("value for {}: {}", name, e)))?;
            map.insert(header, value);
        }
        Ok(map)
    }
}

/// Anything that can resolve a [`Route`] to a JSON document.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_json(&self, route: &Route) -> Result<serde_json::Value, FetchError>;
}

/// Fetch a route and decode it into `T`.
pub async fn fetch_typed<T: DeserializeOwned>(
    fetcher: &dyn Fetch,
    route: &Route,
) -> Result<T, FetchError> {
    let value = fetcher.fetch_json(route).await?;
    serde_json::from_value(value).map_err(|source| FetchError::Schema {
        url: route
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|_| route.path.clone()),
        source,
    })
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("ladder-bot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// reqwest-backed fetcher.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("ladder-bot")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Create a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_json(&self, route: &Route) -> Result<serde_json::Value, FetchError> {
        let url = route.url()?;
        info!("{} {}", route.method, url);

        let response = self
            .client
            .request(route.method.clone(), url.clone())
            .headers(route.header_map()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        debug!("Received {} bytes from {}", body.len(), url);

        serde_json::from_slice(&body).map_err(|source| FetchError::Schema {
            url: url.to_string(),
            source,
        })
    }
}

/// In-memory fetcher for tests: serves canned bodies and records every URL.
#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    enum Canned {
        Body(serde_json::Value),
        Status(u16),
    }

    #[derive(Default)]
    pub struct MockFetcher {
        responses: Mutex<HashMap<String, Canned>>,
        calls: Mutex<Vec<String>>,
        headers: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `body` for the exact URL.
        pub fn respond(&self, url: &str, body: serde_json::Value) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Canned::Body(body));
        }

        /// Fail the exact URL with an HTTP status.
        pub fn fail(&self, url: &str, status: u16) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Canned::Status(status));
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
        }

        pub fn last_headers(&self) -> Vec<(String, String)> {
            self.headers.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl Fetch for MockFetcher {
        async fn fetch_json(&self, route: &Route) -> Result<serde_json::Value, FetchError> {
            let url = route.url()?.to_string();
            self.calls.lock().unwrap().push(url.clone());
            self.headers.lock().unwrap().push(route.headers.clone());

            match self.responses.lock().unwrap().get(&url) {
                Some(Canned::Body(body)) => Ok(body.clone()),
                Some(Canned::Status(status)) => Err(FetchError::UpstreamStatus {
                    status: *status,
                    url,
                }),
                None => Err(FetchError::UpstreamStatus { status: 404, url }),
            }
        }
    }
}
