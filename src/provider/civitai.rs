//! CivitAI catalog provider.
//!
//! Talks to the public `https://civitai.com/api/v1/models` endpoint. Browsing
//! without a text query pages by `page`/`totalPages`; keyword search switches
//! to the cursor protocol because CivitAI's totals are unreliable for query
//! searches. A per-user API token, when the session carries one, is appended
//! to every request so early-access files resolve.

use crate::api::{ModelResult, PagingMode, PagingStrategy, SearchPage, SearchQuery};
use crate::cache::{ProviderCache, SEARCH_TTL};
use crate::error::Result;
use crate::gate::ConcurrencyGate;
use crate::host::{HostHttp, UserSession};
use crate::provider::common::{self, StringOrNumber, UrlBuilder};
use crate::traits::SearchProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const PROVIDER: &str = "CivitAI";
const BASE_URL: &str = "https://civitai.com/api/v1";
const ALLOWED_SORTS: [&str; 3] = ["Highest Rated", "Most Downloaded", "Newest"];
const DEFAULT_SORT: &str = "Most Downloaded";
const MAX_PAGE: u32 = 500;
const MAX_LIMIT: u32 = 100;
const GATE_SLOTS: usize = 4;

/// Search adapter for the CivitAI model catalog.
pub struct CivitaiProvider {
    http: Arc<dyn HostHttp>,
    cache: ProviderCache<SearchPage>,
    gate: ConcurrencyGate,
}

impl CivitaiProvider {
    pub fn new(http: Arc<dyn HostHttp>) -> Self {
        Self {
            http,
            cache: ProviderCache::new(SEARCH_TTL),
            gate: ConcurrencyGate::new(GATE_SLOTS),
        }
    }

    async fn fetch_page(&self, cleaned: &CleanedQuery, api_key: Option<&str>) -> Result<SearchPage> {
        let url = build_search_url(cleaned, api_key);
        let response: SearchResponse =
            common::fetch_json(self.http.as_ref(), PROVIDER, &url).await?;

        let raw_count = response.items.len() as u64;
        let mut items: Vec<ModelResult> = response
            .items
            .iter()
            .map(|item| normalize_model(item, item.id))
            .filter(common::is_complete_result)
            .collect();

        let metadata = response.metadata;
        let mut next_cursor = None;
        if cleaned.cursor_mode() {
            next_cursor = metadata
                .next_cursor
                .as_ref()
                .map(StringOrNumber::as_string)
                .filter(|cursor| !cursor.trim().is_empty());
            if next_cursor.is_none() {
                next_cursor = metadata
                    .next_page
                    .as_deref()
                    .and_then(|next_page| common::query_param(next_page, "cursor"))
                    .filter(|cursor| !cursor.trim().is_empty());
            }
        }

        // CivitAI sometimes returns a nextCursor that is really the ID of a
        // model missing from the page it just served. When the page is
        // under-full, recover that model with a point lookup and drop the
        // dead-end cursor.
        if cleaned.cursor_mode() && items.len() < cleaned.limit as usize {
            if let Some(cursor_id) = next_cursor.as_deref().and_then(parse_cursor_id) {
                let id_text = cursor_id.to_string();
                if items.iter().all(|item| item.model_id != id_text) {
                    match self.recover_by_id(cleaned, api_key, cursor_id).await {
                        Ok(Some(recovered)) => {
                            items.push(recovered);
                            next_cursor = None;
                        }
                        Ok(None) => {}
                        Err(err) => {
                            tracing::warn!(
                                provider = PROVIDER,
                                model_id = cursor_id,
                                error = %err,
                                "point lookup for cursor model failed"
                            );
                        }
                    }
                }
            }
        }

        Ok(SearchPage {
            mode: if cleaned.cursor_mode() {
                PagingMode::Cursor
            } else {
                PagingMode::Page
            },
            page: metadata.current_page.unwrap_or(cleaned.page),
            total_pages: metadata.total_pages.unwrap_or(1),
            has_more: None,
            next_cursor,
            total_items: metadata.total_items.unwrap_or(raw_count),
            items,
        })
    }

    /// Point lookup for a model the cursor references but the page omitted.
    /// The recovered model must still match the active type and query filters
    /// to be worth splicing in.
    async fn recover_by_id(
        &self,
        cleaned: &CleanedQuery,
        api_key: Option<&str>,
        model_id: u64,
    ) -> Result<Option<ModelResult>> {
        let mut url = UrlBuilder::new(format!("{BASE_URL}/models/{model_id}"));
        if let Some(key) = api_key {
            url = url.add("token", &common::sanitize_token(key));
        }
        let model: CivitaiModel =
            common::fetch_json(self.http.as_ref(), PROVIDER, &url.build()).await?;

        let matches_type = cleaned.model_type.is_empty()
            || cleaned.model_type == "All"
            || model.model_type.eq_ignore_ascii_case(&cleaned.model_type);
        let matches_query = model
            .name
            .to_lowercase()
            .contains(&cleaned.text.trim().to_lowercase());
        if !matches_type || !matches_query {
            return Ok(None);
        }

        let recovered = normalize_model(&model, model_id);
        Ok(Some(recovered).filter(common::is_complete_result))
    }
}

#[async_trait]
impl SearchProvider for CivitaiProvider {
    fn provider_id(&self) -> &'static str {
        "civitai"
    }

    fn display_name(&self) -> &'static str {
        PROVIDER
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn supports_nsfw(&self) -> bool {
        true
    }

    fn paging(&self, query: &SearchQuery) -> PagingStrategy {
        if query.query.trim().is_empty() {
            PagingStrategy::PageTotal
        } else {
            PagingStrategy::Cursor
        }
    }

    async fn search(&self, session: &dyn UserSession, query: &SearchQuery) -> Result<SearchPage> {
        let cleaned = CleanedQuery::from_request(session, query);
        let api_key = session.api_key(self.provider_id());

        let key = cache_key(&cleaned, api_key.is_some());
        if let Some(page) = self.cache.get(&key) {
            metrics::counter!("model_search.cache", "provider" => "civitai", "status" => "hit")
                .increment(1);
            return Ok(page);
        }
        metrics::counter!("model_search.cache", "provider" => "civitai", "status" => "miss")
            .increment(1);

        let _permit = self.gate.acquire().await;
        let page = self.fetch_page(&cleaned, api_key.as_deref()).await?;
        self.cache.insert(key, page.clone());
        Ok(page)
    }
}

/// Request fields after clamping, permission gating, and vocabulary fixes.
struct CleanedQuery {
    text: String,
    page: u32,
    limit: u32,
    cursor: String,
    model_type: String,
    base_model: String,
    sort: String,
    nsfw: bool,
}

impl CleanedQuery {
    fn from_request(session: &dyn UserSession, query: &SearchQuery) -> Self {
        Self {
            text: query.query.clone(),
            page: query.page.clamp(1, MAX_PAGE),
            limit: query.limit.clamp(1, MAX_LIMIT),
            cursor: query.cursor.clone(),
            model_type: normalize_type(&query.model_type),
            base_model: query.base_model.clone(),
            sort: normalize_sort(&query.sort),
            nsfw: query.include_nsfw && session.has_nsfw_permission(),
        }
    }

    fn cursor_mode(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Sorts outside the allow-list (exact match) silently fall back to the
/// default rather than erroring.
fn normalize_sort(sort: &str) -> String {
    let trimmed = sort.trim();
    if ALLOWED_SORTS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        DEFAULT_SORT.to_string()
    }
}

/// The UI vocabulary says "ControlNet"; CivitAI's API wants "Controlnet".
fn normalize_type(model_type: &str) -> String {
    let trimmed = model_type.trim();
    if trimmed == "ControlNet" {
        "Controlnet".to_string()
    } else {
        trimmed.to_string()
    }
}

fn build_search_url(cleaned: &CleanedQuery, api_key: Option<&str>) -> String {
    let mut url = UrlBuilder::new(format!("{BASE_URL}/models"));
    if cleaned.cursor_mode() {
        url = url
            .add_num("limit", cleaned.limit)
            .add("cursor", &cleaned.cursor)
            .add("query", &cleaned.text);
    } else {
        url = url
            .add_num("page", cleaned.page)
            .add_num("limit", cleaned.limit);
    }
    url = url
        .add_if(cleaned.model_type != "All", "types", &cleaned.model_type)
        .add_if(cleaned.base_model != "All", "baseModels", &cleaned.base_model)
        .add("sort", &cleaned.sort)
        .add_if(cleaned.nsfw, "nsfw", "true");
    if let Some(key) = api_key {
        url = url.add("token", &common::sanitize_token(key));
    }
    url.build()
}

/// Whether the session holds a token changes what the upstream returns, so it
/// is part of the key.
fn cache_key(cleaned: &CleanedQuery, has_key: bool) -> String {
    format!(
        "civitai:search:{}:{}:{}:{}:{}:{}:{}:{}:{}",
        cleaned.text,
        cleaned.page,
        cleaned.limit,
        cleaned.cursor,
        cleaned.model_type,
        cleaned.base_model,
        cleaned.sort,
        cleaned.nsfw,
        has_key,
    )
}

fn parse_cursor_id(cursor: &str) -> Option<u64> {
    cursor.trim().parse().ok()
}

fn select_best_file(files: &[VersionFile]) -> Option<&VersionFile> {
    files
        .iter()
        .find(|file| common::is_weight_file(&file.name))
        .or_else(|| files.first())
}

/// Flatten one raw catalog record into the canonical result shape. Only the
/// first model version is considered; CivitAI orders versions newest-first.
fn normalize_model(model: &CivitaiModel, model_id: u64) -> ModelResult {
    let version = model.model_versions.first();
    let best_file = version.and_then(|v| select_best_file(&v.files));
    let download_url = best_file
        .map(|file| file.download_url.clone())
        .unwrap_or_default();
    let download_id = match download_url.rfind('/') {
        Some(slash) => download_url[slash + 1..].to_string(),
        None => String::new(),
    };
    let version_id = version.map(|v| v.id).unwrap_or_default();
    let open_url = if model_id > 0 && version_id > 0 {
        format!("https://civitai.com/models/{model_id}?modelVersionId={version_id}")
    } else if model_id > 0 {
        format!("https://civitai.com/models/{model_id}")
    } else {
        String::new()
    };
    let image = version
        .and_then(|v| v.images.iter().find(|img| img.image_type == "image"))
        .map(|img| img.url.clone())
        .unwrap_or_default();

    ModelResult {
        model_id: if model_id > 0 {
            model_id.to_string()
        } else {
            String::new()
        },
        model_version_id: if version_id > 0 {
            version_id.to_string()
        } else {
            String::new()
        },
        name: model.name.clone(),
        model_type: model.model_type.clone(),
        description: model.description.clone(),
        creator: model
            .creator
            .as_ref()
            .map(|c| c.username.clone())
            .unwrap_or_default(),
        downloads: model
            .stats
            .as_ref()
            .map(|s| s.download_count)
            .unwrap_or_default(),
        version_name: version.map(|v| v.name.clone()).unwrap_or_default(),
        base_model: version.map(|v| v.base_model.clone()).unwrap_or_default(),
        image,
        download_url,
        download_id,
        file_name: best_file.map(|file| file.name.clone()).unwrap_or_default(),
        file_size: best_file
            .and_then(|file| file.size_kb)
            .map(|kb| (kb * 1024.0) as u64),
        open_url,
        download_options: None,
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<CivitaiModel>,
    #[serde(default)]
    metadata: PageMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMetadata {
    current_page: Option<u32>,
    total_pages: Option<u32>,
    total_items: Option<u64>,
    next_cursor: Option<StringOrNumber>,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CivitaiModel {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    model_type: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    creator: Option<Creator>,
    #[serde(default)]
    stats: Option<ModelStats>,
    #[serde(default)]
    model_versions: Vec<ModelVersion>,
}

#[derive(Debug, Deserialize)]
struct Creator {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelStats {
    #[serde(default)]
    download_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelVersion {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    base_model: String,
    #[serde(default)]
    files: Vec<VersionFile>,
    #[serde(default)]
    images: Vec<VersionImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    download_url: String,
    #[serde(default, rename = "sizeKB")]
    size_kb: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VersionImage {
    #[serde(default)]
    url: String,
    #[serde(default, rename = "type")]
    image_type: String,
}
