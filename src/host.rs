//! Collaborator seams supplied by the host application: outbound HTTP, the
//! user session (permissions and stored API keys), and the download sink.
//!
//! Providers never talk to the network or the user account directly; they go
//! through these traits so tests and embedding hosts can substitute their own
//! implementations.

use crate::api::DownloadHandoff;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure from [`HostHttp`]: DNS, connect, TLS, timeout, or
/// a broken body stream. Providers map this to their own "failed to contact"
/// error; the detail string only ever reaches logs.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// A completed HTTP exchange: status plus body, with the two response headers
/// any provider cares about.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Media type portion of the `Content-Type` header (parameters stripped).
    pub content_type: Option<String>,
    /// All `Link` header values, comma-joined when the upstream sent several.
    pub link: Option<String>,
}

impl FetchedResponse {
    /// Shorthand for building a bodied response in tests and mocks.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: None,
            link: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Host-supplied HTTP GET capability.
///
/// The contract is deliberately minimal: one verb, no request headers beyond
/// what the implementation bakes in. Auth tokens travel as query parameters
/// where a provider needs them, matching the upstream APIs.
#[async_trait]
pub trait HostHttp: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<FetchedResponse, FetchError>;
}

/// Host-supplied view of the requesting user: permission checks and stored
/// per-provider API keys.
pub trait UserSession: Send + Sync {
    /// Whether this user may opt into adult content.
    fn has_nsfw_permission(&self) -> bool;

    /// The user's stored API key for `provider_id`, if any.
    fn api_key(&self, provider_id: &str) -> Option<String>;
}

/// Session with no permissions and no stored keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSession;

impl UserSession for AnonymousSession {
    fn has_nsfw_permission(&self) -> bool {
        false
    }

    fn api_key(&self, _provider_id: &str) -> Option<String> {
        None
    }
}

/// External downloader the service hands chosen results to. File transfer
/// itself happens entirely on the sink's side.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn enqueue(&self, handoff: DownloadHandoff) -> Result<()>;
}

/// Production [`HostHttp`] backed by a shared [`reqwest::Client`].
pub struct ReqwestHttp {
    client: Client,
}

impl ReqwestHttp {
    /// Total per-request deadline. Upstream catalogs occasionally hang on
    /// large description payloads; without a deadline a stuck search pins its
    /// concurrency slot indefinitely.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("modelscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Use a caller-configured client instead of the default one.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestHttp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostHttp for ReqwestHttp {
    async fn get(&self, url: &str) -> std::result::Result<FetchedResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError(err.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string());
        let links: Vec<&str> = response
            .headers()
            .get_all(reqwest::header::LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        let link = if links.is_empty() {
            None
        } else {
            Some(links.join(", "))
        };

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError(err.to_string()))?
            .to_vec();

        Ok(FetchedResponse {
            status,
            body,
            content_type,
            link,
        })
    }
}
