//! Hartsy catalog provider.
//!
//! Talks to the Hartsy REST API (`/models/search`, `/models/filters`). The
//! upstream always reports paging as the current page plus a `hasMore` flag,
//! never a total, so `totalPages` here is synthesized for display. Filter
//! vocabulary (architectures, tags, sorts) is discovered from the API and
//! cached far longer than search results.

use crate::api::{FilterOptions, ModelResult, PagingMode, PagingStrategy, SearchPage, SearchQuery};
use crate::cache::{FILTER_TTL, ProviderCache, SEARCH_TTL};
use crate::error::{ProviderError, Result};
use crate::gate::ConcurrencyGate;
use crate::host::{HostHttp, UserSession};
use crate::provider::common::{self, StringOrNumber, UrlBuilder};
use crate::traits::SearchProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const PROVIDER: &str = "Hartsy";
const BASE_URL: &str = "https://hartsy.ai/api/v1";
const ALLOWED_SORTS: [&str; 3] = ["popular", "newest", "downloads"];
const DEFAULT_SORT: &str = "popular";
const MAX_PAGE: u32 = 500;
const MAX_LIMIT: u32 = 100;
const GATE_SLOTS: usize = 3;
const FILTERS_CACHE_KEY: &str = "hartsy:filters";

/// Search adapter for the Hartsy model catalog.
pub struct HartsyProvider {
    http: Arc<dyn HostHttp>,
    base_url: String,
    cache: ProviderCache<SearchPage>,
    filters_cache: ProviderCache<FilterOptions>,
    gate: ConcurrencyGate,
}

impl HartsyProvider {
    pub fn new(http: Arc<dyn HostHttp>) -> Self {
        Self::with_base_url(http, BASE_URL)
    }

    /// Point the provider at a different deployment, e.g. a staging stack.
    pub fn with_base_url(http: Arc<dyn HostHttp>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            cache: ProviderCache::new(SEARCH_TTL),
            filters_cache: ProviderCache::new(FILTER_TTL),
            gate: ConcurrencyGate::new(GATE_SLOTS),
        }
    }

    fn build_search_url(&self, cleaned: &CleanedQuery) -> String {
        UrlBuilder::new(format!("{}/models/search", self.base_url))
            .add("query", &cleaned.text)
            .add_num("page", cleaned.page)
            .add_num("limit", cleaned.limit)
            .add_if(cleaned.model_type != "All", "type", &cleaned.model_type)
            .add_if(
                cleaned.architecture != "All",
                "architecture",
                &cleaned.architecture,
            )
            .add("sort", &cleaned.sort)
            .build()
    }
}

#[async_trait]
impl SearchProvider for HartsyProvider {
    fn provider_id(&self) -> &'static str {
        "hartsy"
    }

    fn display_name(&self) -> &'static str {
        PROVIDER
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn supports_nsfw(&self) -> bool {
        false
    }

    fn paging(&self, _query: &SearchQuery) -> PagingStrategy {
        PagingStrategy::PageHasMore
    }

    async fn search(&self, _session: &dyn UserSession, query: &SearchQuery) -> Result<SearchPage> {
        let cleaned = CleanedQuery::from_request(query);

        let key = cache_key(&cleaned);
        if let Some(page) = self.cache.get(&key) {
            metrics::counter!("model_search.cache", "provider" => "hartsy", "status" => "hit")
                .increment(1);
            return Ok(page);
        }
        metrics::counter!("model_search.cache", "provider" => "hartsy", "status" => "miss")
            .increment(1);

        let _permit = self.gate.acquire().await;
        let url = self.build_search_url(&cleaned);
        let response: SearchResponse =
            common::fetch_json(self.http.as_ref(), PROVIDER, &url).await?;
        if !response.success {
            tracing::warn!(
                provider = PROVIDER,
                error = response.error.as_deref().unwrap_or("unknown"),
                "upstream reported failure"
            );
            return Err(ProviderError::InvalidData { provider: PROVIDER });
        }

        let items: Vec<ModelResult> = response
            .items
            .iter()
            .map(normalize_hartsy_model)
            .filter(common::is_complete_result)
            .collect();

        let page_number = response.page.unwrap_or(cleaned.page);
        let total_pages = if response.has_more {
            page_number + 1
        } else {
            page_number
        };
        let page = SearchPage {
            mode: PagingMode::Page,
            page: page_number,
            total_pages: total_pages.max(1),
            has_more: Some(response.has_more),
            next_cursor: None,
            total_items: response.total_items.unwrap_or(items.len() as u64),
            items,
        };
        self.cache.insert(key, page.clone());
        Ok(page)
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        if let Some(options) = self.filters_cache.get(FILTERS_CACHE_KEY) {
            return Ok(options);
        }

        let _permit = self.gate.acquire().await;
        let url = format!("{}/models/filters", self.base_url);
        let response: FiltersResponse =
            common::fetch_json(self.http.as_ref(), PROVIDER, &url).await?;
        if !response.success {
            tracing::warn!(
                provider = PROVIDER,
                error = response.error.as_deref().unwrap_or("unknown"),
                "upstream rejected filter discovery"
            );
            return Err(ProviderError::InvalidData { provider: PROVIDER });
        }

        let mut options = FilterOptions {
            architectures: response.architectures,
            tags: response.tags,
            sorts: response.sorts,
        };
        if options.sorts.is_empty() {
            options.sorts = ALLOWED_SORTS.iter().map(|sort| sort.to_string()).collect();
        }
        self.filters_cache.insert(FILTERS_CACHE_KEY, options.clone());
        Ok(options)
    }
}

/// Request fields after clamping and vocabulary fixes. Hartsy has no NSFW
/// switch, so the flag is dropped here no matter what the session allows.
struct CleanedQuery {
    text: String,
    page: u32,
    limit: u32,
    model_type: String,
    architecture: String,
    sort: String,
}

impl CleanedQuery {
    fn from_request(query: &SearchQuery) -> Self {
        Self {
            text: query.query.clone(),
            page: query.page.clamp(1, MAX_PAGE),
            limit: query.limit.clamp(1, MAX_LIMIT),
            model_type: query.model_type.trim().to_string(),
            architecture: query.base_model.clone(),
            sort: normalize_sort(&query.sort),
        }
    }
}

fn normalize_sort(sort: &str) -> String {
    let trimmed = sort.trim();
    if ALLOWED_SORTS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        DEFAULT_SORT.to_string()
    }
}

fn cache_key(cleaned: &CleanedQuery) -> String {
    format!(
        "hartsy:search:{}:{}:{}:{}:{}:{}",
        cleaned.text,
        cleaned.page,
        cleaned.limit,
        cleaned.model_type,
        cleaned.architecture,
        cleaned.sort,
    )
}

/// Upstream content-type vocabulary mapped to the shared display strings.
/// Unknown values pass through unchanged.
fn map_content_type(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "checkpoint" => "Checkpoint".to_string(),
        "lora" => "LoRA".to_string(),
        "locon" => "LoCon".to_string(),
        "lycoris" => "LyCORIS".to_string(),
        "embedding" | "textual-inversion" => "Embedding".to_string(),
        "controlnet" => "ControlNet".to_string(),
        "vae" => "VAE".to_string(),
        _ => trimmed.to_string(),
    }
}

fn normalize_hartsy_model(model: &HartsyModel) -> ModelResult {
    ModelResult {
        model_id: model
            .id
            .as_ref()
            .map(StringOrNumber::as_string)
            .unwrap_or_default(),
        model_version_id: String::new(),
        name: model.name.clone(),
        model_type: map_content_type(&model.model_type),
        description: model.description.clone(),
        creator: model.creator.clone(),
        downloads: model.downloads,
        version_name: model.version.clone(),
        base_model: model.architecture.clone(),
        image: model.image_url.clone(),
        download_url: model.download_url.clone(),
        download_id: String::new(),
        file_name: model.file_name.clone(),
        file_size: model.file_size,
        open_url: model.page_url.clone(),
        download_options: None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    items: Vec<HartsyModel>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    total_items: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HartsyModel {
    id: Option<StringOrNumber>,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    model_type: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    creator: String,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    version: String,
    #[serde(default)]
    architecture: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    download_url: String,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    file_size: Option<u64>,
    #[serde(default)]
    page_url: String,
}

#[derive(Debug, Deserialize)]
struct FiltersResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    architectures: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    sorts: Vec<String>,
}
