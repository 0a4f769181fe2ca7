//! Blocking HTTP client for the Mastodon REST API, behind a small transport trait.

use crate::fetcher::error::FetchError;
use reqwest::header::{HeaderValue, ACCEPT, LINK};
use reqwest::Url;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("mastofollows/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
const MAX_REDIRECTS: usize = 10;

/// Status, pagination header and body of one completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Link` header, if the server sent one.
    pub link: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can perform a GET and hand back the whole response.
///
/// Returns `Err` only when no response was received (or its body could not be read);
/// non-success statuses come back as `Ok` and are judged by the caller.
pub trait Transport {
    fn get(&mut self, url: &Url) -> Result<HttpResponse, FetchError>;
}

/// reqwest-backed transport. One instance per run, owned by the caller.
#[derive(Debug)]
pub struct ApiClient {
    inner: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }
}

impl Transport for ApiClient {
    fn get(&mut self, url: &Url) -> Result<HttpResponse, FetchError> {
        let response = self
            .inner
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status().as_u16();
        let link = response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        let body = response.text().map_err(|e| FetchError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        Ok(HttpResponse {
            status,
            link: if link.is_empty() { None } else { Some(link) },
            body,
        })
    }
}

/// Builder for ApiClient with optional User-Agent and timeout.
#[derive(Debug)]
pub struct ApiClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiClientBuilder {
    /// Set a custom User-Agent. If not set, `mastofollows/<version>` is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 5. Passed to reqwest unchanged.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<ApiClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(ApiClient { inner })
    }
}
