//! The capability contract every search provider must satisfy.

use crate::api::{FileListing, FilterOptions, PagingStrategy, ProviderInfo, SearchPage, SearchQuery};
use crate::error::{ProviderError, Result};
use crate::host::UserSession;
use async_trait::async_trait;

/// A pluggable backend adapter for one external model-hosting service.
///
/// Providers are stateless per request: cursors, page numbers, and filter
/// selections live with the caller (see [`SearchPager`](crate::pager::SearchPager)),
/// while the provider owns only its process-wide caches and concurrency gate.
/// Providers are registered with
/// [`SearchServiceBuilder::register_provider`](crate::service::SearchServiceBuilder::register_provider)
/// and identified by their [`provider_id`](SearchProvider::provider_id).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable identifier used for routing and cache keys (e.g. `"civitai"`).
    fn provider_id(&self) -> &'static str;

    /// Human-facing name for provider pickers.
    fn display_name(&self) -> &'static str;

    /// Whether type / base-model / sort filters are meaningful here. When
    /// `false`, filter fields in a query are silently ignored, never an error.
    fn supports_filters(&self) -> bool;

    /// Whether this provider can opt into adult content at all.
    fn supports_nsfw(&self) -> bool;

    /// The pagination scheme used for this particular query. Not necessarily
    /// constant per provider: CivitAI pages plain browsing but forces cursors
    /// for free-text search.
    fn paging(&self, query: &SearchQuery) -> PagingStrategy;

    /// Execute one search request.
    ///
    /// Implementations clamp `limit`/`page` to their safe ranges, downgrade
    /// `include_nsfw` when the session lacks the permission, and surface every
    /// upstream failure as a [`ProviderError`] rather than letting transport
    /// or parse errors escape raw.
    async fn search(&self, session: &dyn UserSession, query: &SearchQuery) -> Result<SearchPage>;

    /// Categorical filter values for building filter UIs. Providers without a
    /// discovery endpoint report [`ProviderError::Unsupported`].
    async fn filter_options(&self) -> Result<FilterOptions> {
        Err(ProviderError::Unsupported {
            provider: self.display_name(),
            operation: "filter options",
        })
    }

    /// Enumerate all downloadable files of one model, beyond the best-guess
    /// file its search result carries. `limit` caps the returned list.
    async fn list_files(&self, model_id: &str, limit: u32) -> Result<FileListing> {
        let _ = (model_id, limit);
        Err(ProviderError::Unsupported {
            provider: self.display_name(),
            operation: "file listing",
        })
    }

    /// Lazily resolve a preview image for one model, returning an absolute
    /// URL, an inline data URL, or an empty string when nothing was found.
    async fn preview_image(&self, model_id: &str) -> Result<String> {
        let _ = model_id;
        Err(ProviderError::Unsupported {
            provider: self.display_name(),
            operation: "preview images",
        })
    }

    /// Static capability description for listings.
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: self.provider_id().to_string(),
            display_name: self.display_name().to_string(),
            supports_filters: self.supports_filters(),
            supports_nsfw: self.supports_nsfw(),
        }
    }
}

impl std::fmt::Debug for dyn SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchProvider")
            .field("provider_id", &self.provider_id())
            .finish_non_exhaustive()
    }
}
