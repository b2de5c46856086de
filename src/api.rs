//! Public API types shared by every provider: search requests, canonical
//! model results, and the uniform response envelopes.

use crate::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};

/// The pagination scheme a provider uses for a given request.
///
/// This is a provider-declared policy, not a wire value: the pager inspects it
/// to decide which navigation state (page number vs. cursor stack) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagingStrategy {
    /// Page-based with a known total page count.
    PageTotal,
    /// Page-based, but the upstream only reports a "has more" flag.
    PageHasMore,
    /// Opaque forward-only cursor; no page count is known.
    Cursor,
}

impl PagingStrategy {
    /// The wire-level mode this strategy reports in envelopes.
    pub fn mode(&self) -> PagingMode {
        match self {
            Self::PageTotal | Self::PageHasMore => PagingMode::Page,
            Self::Cursor => PagingMode::Cursor,
        }
    }

    /// Whether navigation state is a cursor stack rather than a page number.
    pub fn is_cursor(&self) -> bool {
        matches!(self, Self::Cursor)
    }
}

/// Wire-level paging mode reported in a [`SearchPage`], deciding which paging
/// fields of the envelope are authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// `page` / `totalPages` (or `hasMore`) are authoritative.
    #[default]
    Page,
    /// `nextCursor` is authoritative; `null` means no further page.
    Cursor,
}

impl std::fmt::Display for PagingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Page => write!(f, "page"),
            Self::Cursor => write!(f, "cursor"),
        }
    }
}

/// One uniform search request, dispatched to any provider.
///
/// Providers ignore the fields they have no use for: unsupported filters are
/// silently dropped, cursor is meaningless to page-based providers, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free-text query. Empty means "browse".
    pub query: String,
    /// 1-based page number for page-mode providers.
    pub page: u32,
    /// Requested page size. Providers clamp this to their own safe range.
    pub limit: u32,
    /// Opaque cursor token for cursor-mode providers. Empty means "first page".
    pub cursor: String,
    /// Coarse model category filter (e.g. `"LORA"`). Empty or `"All"` means no filter.
    #[serde(rename = "type")]
    pub model_type: String,
    /// Base architecture filter (e.g. `"SDXL 1.0"`). Empty or `"All"` means no filter.
    pub base_model: String,
    /// Sort order. Validated against a provider-specific allow-list.
    pub sort: String,
    /// Opt into adult content. Forced off inside the provider when the session
    /// lacks the NSFW permission.
    pub include_nsfw: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            limit: 24,
            cursor: String::new(),
            model_type: String::new(),
            base_model: String::new(),
            sort: String::new(),
            include_nsfw: false,
        }
    }
}

impl SearchQuery {
    /// Construct a browse request (empty query) for the given page.
    pub fn browse(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Construct a free-text search request for the first page.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// A single downloadable file attached to a model result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFile {
    /// Repo-relative or plain file name.
    pub file_name: String,
    /// Direct download URL.
    pub download_url: String,
    /// Size in bytes when the upstream reports one.
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// The canonical, provider-agnostic model record.
///
/// Every provider normalizes its own response shape into this one; the UI
/// renders it without knowing which provider produced it. All identifier
/// fields are strings even where an upstream uses numbers, so the shape is
/// identical across providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelResult {
    /// Provider-scoped model identifier. Never empty for a valid result.
    pub model_id: String,
    /// Provider-scoped version identifier; empty when the provider has no
    /// version concept.
    pub model_version_id: String,
    pub name: String,
    /// Coarse category in the shared display vocabulary.
    #[serde(rename = "type")]
    pub model_type: String,
    /// Raw description; may contain HTML or Markdown. Sanitizing is the
    /// consumer's job.
    pub description: String,
    pub creator: String,
    pub downloads: u64,
    pub version_name: String,
    /// Architecture / base-model tag (e.g. `"SDXL 1.0"`).
    pub base_model: String,
    /// Absolute URL or inline data URL; empty when unresolved (resolution may
    /// be deferred to the image queue).
    pub image: String,
    /// Best single direct-download URL, empty when none could be determined.
    pub download_url: String,
    /// Trailing path segment of `download_url`, when one exists.
    pub download_id: String,
    pub file_name: String,
    pub file_size: Option<u64>,
    /// Human-facing page for the model.
    pub open_url: String,
    /// All downloadable candidates, best first. Absent when the provider only
    /// surfaces a single file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_options: Option<Vec<DownloadFile>>,
}

impl ModelResult {
    /// Whether this result carries at least one real downloadable file, via
    /// either `download_url` or a non-empty `download_options` list. Results
    /// without one are dropped during normalization.
    pub fn has_download_source(&self) -> bool {
        !self.download_url.is_empty()
            || self
                .download_options
                .as_ref()
                .is_some_and(|opts| !opts.is_empty())
    }

    /// The primary downloadable file: `download_url` when set, otherwise the
    /// first `download_options` entry.
    pub fn primary_file(&self) -> Option<DownloadFile> {
        if !self.download_url.is_empty() {
            return Some(DownloadFile {
                file_name: self.file_name.clone(),
                download_url: self.download_url.clone(),
                file_size: self.file_size,
            });
        }
        self.download_options
            .as_ref()
            .and_then(|opts| opts.first().cloned())
    }
}

/// One page of normalized search results plus the paging facts needed to
/// navigate from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Which paging fields are authoritative.
    pub mode: PagingMode,
    /// Current 1-based page. Informational in cursor mode.
    pub page: u32,
    /// Total page count, at least 1. Synthesized for providers that only
    /// report a has-more flag.
    pub total_pages: u32,
    /// Present only for providers that report "has more" instead of a total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
    /// Cursor for the next page; `None` means exhausted. Always serialized in
    /// cursor mode (as `null` when exhausted).
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Best-effort total item count; may be an estimate.
    pub total_items: u64,
    /// Normalized items in upstream order. Never re-sorted.
    pub items: Vec<ModelResult>,
}

impl SearchPage {
    /// Whether a "next page" navigation is possible from this page.
    pub fn can_advance(&self) -> bool {
        match self.mode {
            PagingMode::Cursor => self.next_cursor.is_some(),
            PagingMode::Page => self.has_more.unwrap_or(self.page < self.total_pages),
        }
    }
}

/// Uniform top-level search response: either a successful page or an error
/// message, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub page: Option<SearchPage>,
}

impl SearchEnvelope {
    /// Wrap a successful page.
    pub fn ok(page: SearchPage) -> Self {
        Self {
            success: true,
            error: None,
            page: Some(page),
        }
    }

    /// Wrap a failure with a human-readable message.
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            page: None,
        }
    }
}

/// Categorical filter values a provider offers for narrowing searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub architectures: Vec<String>,
    pub tags: Vec<String>,
    pub sorts: Vec<String>,
}

/// Envelope for [`FilterOptions`] responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptionsEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub options: Option<FilterOptions>,
}

impl FilterOptionsEnvelope {
    pub fn ok(options: FilterOptions) -> Self {
        Self {
            success: true,
            error: None,
            options: Some(options),
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            options: None,
        }
    }
}

/// Full file inventory of one model, beyond the single best-guess file a
/// search result carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    pub model_id: String,
    pub files: Vec<DownloadFile>,
    /// True when the upstream reported more files than were returned.
    pub truncated: bool,
}

/// Envelope for [`FileListing`] responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileListingEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub listing: Option<FileListing>,
}

impl FileListingEnvelope {
    pub fn ok(listing: FileListing) -> Self {
        Self {
            success: true,
            error: None,
            listing: Some(listing),
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            listing: None,
        }
    }
}

/// Envelope for lazy preview-image resolution. `success` with an empty
/// `image` is a valid outcome: the provider looked and found nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEnvelope {
    pub success: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageEnvelope {
    pub fn ok(image: impl Into<String>) -> Self {
        Self {
            success: true,
            image: image.into(),
            error: None,
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            image: String::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Static description of one registered provider, for capability listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub display_name: String,
    pub supports_filters: bool,
    pub supports_nsfw: bool,
}

/// The record handed to the external download sink when the user picks a
/// result: everything the downloader needs, nothing provider-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadHandoff {
    pub name: String,
    pub url: String,
    pub preview_image: String,
    #[serde(rename = "type")]
    pub model_type: String,
    /// The full canonical result as JSON, for downstream metadata sidecars.
    pub metadata_json: String,
}

impl DownloadHandoff {
    /// Build a handoff for the primary file of `result`.
    ///
    /// Fails with [`ProviderError::InvalidRequest`] if the result has no
    /// downloadable file.
    pub fn for_primary_file(result: &ModelResult) -> Result<Self> {
        let file = result.primary_file().ok_or_else(|| {
            ProviderError::InvalidRequest(format!(
                "Model '{}' has no downloadable file.",
                result.name
            ))
        })?;
        Ok(Self {
            name: result.name.clone(),
            url: file.download_url,
            preview_image: result.image.clone(),
            model_type: result.model_type.clone(),
            metadata_json: serde_json::to_string(result).unwrap_or_default(),
        })
    }
}
