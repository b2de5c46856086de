//! Shared plumbing for all provider implementations: URL assembly, HTTP
//! status/error mapping, JSON fetching, and filename classification.

use crate::api::ModelResult;
use crate::error::{ProviderError, Result};
use crate::host::{FetchedResponse, HostHttp};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Error bodies are truncated to this many characters before being surfaced
/// to clients, so a misbehaving upstream cannot flood the UI or logs.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// File extensions considered downloadable model weights or archives.
pub(crate) const MODEL_FILE_EXTENSIONS: [&str; 7] = [
    ".safetensors",
    ".gguf",
    ".sft",
    ".ckpt",
    ".pt",
    ".bin",
    ".zip",
];

/// Preferred weight extensions for best-file selection, in no priority order;
/// the first file carrying any of these wins.
pub(crate) const WEIGHT_EXTENSIONS: [&str; 3] = [".safetensors", ".sft", ".gguf"];

const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".webp", ".gif"];

const PREVIEW_BASENAMES: [&str; 7] = [
    "thumbnail", "teaser", "cover", "banner", "preview", "example", "sample",
];

/// A JSON scalar that some upstreams serialize as a string and others as a
/// number (CivitAI cursors, Hartsy IDs).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum StringOrNumber {
    String(String),
    Int(u64),
    Float(f64),
}

impl StringOrNumber {
    pub(crate) fn as_string(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
        }
    }
}

/// Query-string assembler that skips blank values.
pub(crate) struct UrlBuilder {
    base: String,
    params: Vec<(String, String)>,
}

impl UrlBuilder {
    pub(crate) fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: Vec::new(),
        }
    }

    /// Append `key=value`, skipping blank values entirely.
    pub(crate) fn add(mut self, key: &str, value: &str) -> Self {
        if !value.trim().is_empty() {
            self.params.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub(crate) fn add_num(mut self, key: &str, value: u32) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn add_if(self, condition: bool, key: &str, value: &str) -> Self {
        if condition { self.add(key, value) } else { self }
    }

    pub(crate) fn build(self) -> String {
        if self.params.is_empty() {
            return self.base;
        }
        let query: Vec<String> = self
            .params
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect();
        format!("{}?{}", self.base, query.join("&"))
    }
}

/// Truncate an upstream error body to the surfaced maximum.
pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Map a non-2xx response to [`ProviderError::UpstreamStatus`], logging the
/// full context server-side while clients only see the truncated body.
pub(crate) fn check_status(
    provider: &'static str,
    url: &str,
    response: &FetchedResponse,
) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let body = truncate_body(&response.text());
    tracing::warn!(provider, url, status = response.status, body = %body, "upstream request failed");
    Err(ProviderError::UpstreamStatus {
        provider,
        status: response.status,
        body,
    })
}

/// GET `url` and parse the body as JSON, mapping each failure class to the
/// provider's own error taxonomy: transport failures become
/// [`Unreachable`](ProviderError::Unreachable), non-2xx becomes
/// [`UpstreamStatus`](ProviderError::UpstreamStatus), and parse failures
/// become [`InvalidData`](ProviderError::InvalidData).
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http: &dyn HostHttp,
    provider: &'static str,
    url: &str,
) -> Result<T> {
    let response = http.get(url).await.map_err(|err| {
        tracing::warn!(provider, url, error = %err, "upstream request failed");
        ProviderError::Unreachable { provider }
    })?;
    check_status(provider, url, &response)?;
    serde_json::from_slice(&response.body).map_err(|err| {
        tracing::warn!(provider, url, error = %err, "upstream returned unparseable JSON");
        ProviderError::InvalidData { provider }
    })
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext))
}

/// Whether a filename looks like a downloadable model weight or archive.
pub(crate) fn is_model_file(name: &str) -> bool {
    has_extension(name, &MODEL_FILE_EXTENSIONS)
}

/// Whether a filename carries one of the preferred weight extensions.
pub(crate) fn is_weight_file(name: &str) -> bool {
    has_extension(name, &WEIGHT_EXTENSIONS)
}

pub(crate) fn has_image_extension(name: &str) -> bool {
    has_extension(name, &IMAGE_EXTENSIONS)
}

/// Whether a repo-relative filename matches the preview naming heuristic:
/// an image extension plus a basename ending in one of the conventional
/// preview stems (`thumbnail`, `teaser`, `cover`, ...).
pub(crate) fn is_preview_filename(filename: &str) -> bool {
    if !has_image_extension(filename) {
        return false;
    }
    let stem = file_stem(filename).to_ascii_lowercase();
    PREVIEW_BASENAMES.iter().any(|base| stem.ends_with(base))
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Extract one query parameter from an absolute URL, if present.
pub(crate) fn query_param(raw_url: &str, name: &str) -> Option<String> {
    let parsed = url::Url::parse(raw_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Keep only characters valid in an API token.
pub(crate) fn sanitize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect()
}

/// Completeness rule applied to every normalized item before it reaches the
/// envelope: an item must carry an identifier and at least one usable
/// download source, otherwise the UI would render a card that cannot do
/// anything.
pub(crate) fn is_complete_result(result: &ModelResult) -> bool {
    !result.model_id.is_empty() && result.has_download_source()
}
