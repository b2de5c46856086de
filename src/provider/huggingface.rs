//! Hugging Face Hub provider.
//!
//! Searches `https://huggingface.co/api/models`, which paginates exclusively
//! through an opaque cursor carried in the `Link` response header. The Hub has
//! no type/sort/NSFW parameters, so those request fields are ignored.
//!
//! Preview images are deliberately not resolved during search: a page of 24
//! repos would cost 24 extra fetches. [`HuggingFaceProvider::preview_image`]
//! resolves one repo's image on demand, trying conventional root filenames,
//! then the repo file listing, then images referenced by the README.

use crate::api::{DownloadFile, FileListing, ModelResult, PagingMode, PagingStrategy, SearchPage, SearchQuery};
use crate::cache::{ProviderCache, SEARCH_TTL};
use crate::error::{ProviderError, Result};
use crate::gate::ConcurrencyGate;
use crate::host::{HostHttp, UserSession};
use crate::provider::common::{self, UrlBuilder};
use crate::traits::SearchProvider;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

const PROVIDER: &str = "HuggingFace";
const BASE_URL: &str = "https://huggingface.co";
const MAX_LIMIT: u32 = 100;
const MAX_FILE_LIMIT: u32 = 5000;
const DEFAULT_FILE_LIMIT: u32 = 500;
const MAX_DOWNLOAD_OPTIONS: usize = 25;
const MAX_INLINE_IMAGE_BYTES: usize = 1024 * 1024;
const GATE_SLOTS: usize = 4;

/// Only these hosts (and their subdomains) are fetched server-side and
/// inlined as data URLs. Images anywhere else are returned as plain URLs for
/// the client to load itself.
const TRUSTED_IMAGE_HOSTS: [&str; 2] = ["huggingface.co", "hf.co"];

/// Conventional repo-root preview filenames, probed in order.
const ROOT_PREVIEW_FILES: [&str; 12] = [
    "thumbnail.png",
    "thumbnail.jpg",
    "thumbnail.jpeg",
    "teaser.png",
    "teaser.jpg",
    "teaser.jpeg",
    "cover.png",
    "cover.jpg",
    "cover.jpeg",
    "banner.png",
    "banner.jpg",
    "banner.jpeg",
];

/// README casings seen in the wild, probed in order.
const README_NAMES: [&str; 4] = ["README.md", "readme.md", "README.MD", "Readme.md"];

/// Search adapter for the Hugging Face Hub.
pub struct HuggingFaceProvider {
    http: Arc<dyn HostHttp>,
    cache: ProviderCache<SearchPage>,
    files_cache: ProviderCache<FileListing>,
    gate: ConcurrencyGate,
}

impl HuggingFaceProvider {
    pub fn new(http: Arc<dyn HostHttp>) -> Self {
        Self {
            http,
            cache: ProviderCache::new(SEARCH_TTL),
            files_cache: ProviderCache::new(SEARCH_TTL),
            gate: ConcurrencyGate::new(GATE_SLOTS),
        }
    }

    /// Fetch one search page. Unlike the shared JSON helper this keeps the
    /// response headers, because the pagination cursor only exists in `Link`.
    async fn fetch_search(&self, url: &str) -> Result<(Vec<HfModel>, Option<String>)> {
        let response = self.http.get(url).await.map_err(|err| {
            tracing::warn!(provider = PROVIDER, url, error = %err, "request failed");
            ProviderError::Unreachable { provider: PROVIDER }
        })?;
        common::check_status(PROVIDER, url, &response)?;
        let next_cursor = response.link.as_deref().and_then(parse_link_cursor);
        let models: Vec<HfModel> = serde_json::from_slice(&response.body).map_err(|err| {
            tracing::warn!(provider = PROVIDER, url, error = %err, "upstream returned unparseable JSON");
            ProviderError::InvalidData { provider: PROVIDER }
        })?;
        Ok((models, next_cursor))
    }

    /// GET an image and return it as a `data:` URL, or empty on any failure.
    /// Bodies over [`MAX_INLINE_IMAGE_BYTES`] are refused rather than embedded
    /// in JSON envelopes.
    async fn try_inline_image(&self, url: &str) -> String {
        let Ok(response) = self.http.get(url).await else {
            return String::new();
        };
        if !response.is_success()
            || response.body.is_empty()
            || response.body.len() > MAX_INLINE_IMAGE_BYTES
        {
            return String::new();
        }
        let content_type = response
            .content_type
            .clone()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| infer_content_type(url).to_string());
        format!(
            "data:{content_type};base64,{}",
            STANDARD.encode(&response.body)
        )
    }

    async fn preview_from_siblings(&self, model_id: &str) -> Option<String> {
        let url = format!(
            "{BASE_URL}/api/models/{}?full=true",
            encode_repo_path(model_id)
        );
        let model: HfModel = common::fetch_json(self.http.as_ref(), PROVIDER, &url)
            .await
            .ok()?;
        let preview = model
            .siblings()
            .iter()
            .find(|sibling| common::is_preview_filename(&sibling.rfilename))?;
        let image = self
            .try_inline_image(&resolve_url(model_id, &preview.rfilename))
            .await;
        if image.is_empty() { None } else { Some(image) }
    }

    async fn preview_from_readme(&self, model_id: &str) -> Result<String> {
        for readme in README_NAMES {
            let url = format!("{BASE_URL}/{model_id}/raw/main/{readme}");
            let Ok(response) = self.http.get(&url).await else {
                continue;
            };
            if !response.is_success() {
                continue;
            }
            let markdown = response.text();
            if markdown.trim().is_empty() {
                continue;
            }
            for raw in readme_image_candidates(&markdown) {
                let image_url = normalize_readme_image_url(model_id, &raw);
                if image_url.is_empty() {
                    continue;
                }
                let lower = image_url.to_ascii_lowercase();
                if lower.contains("shields.io") || lower.contains("badge") || lower.ends_with(".svg")
                {
                    continue;
                }
                if !is_trusted_image_host(&image_url) {
                    // Never fetched server-side; the client loads it directly.
                    return Ok(image_url);
                }
                let inline = self.try_inline_image(&image_url).await;
                if !inline.is_empty() {
                    return Ok(inline);
                }
            }
        }
        Ok(String::new())
    }
}

#[async_trait]
impl SearchProvider for HuggingFaceProvider {
    fn provider_id(&self) -> &'static str {
        "huggingface"
    }

    fn display_name(&self) -> &'static str {
        "Hugging Face"
    }

    fn supports_filters(&self) -> bool {
        false
    }

    fn supports_nsfw(&self) -> bool {
        false
    }

    fn paging(&self, _query: &SearchQuery) -> PagingStrategy {
        PagingStrategy::Cursor
    }

    async fn search(&self, _session: &dyn UserSession, query: &SearchQuery) -> Result<SearchPage> {
        let limit = query.limit.clamp(1, MAX_LIMIT);

        let key = format!(
            "huggingface:search:{}:{}:{}",
            query.query, limit, query.cursor
        );
        if let Some(page) = self.cache.get(&key) {
            metrics::counter!("model_search.cache", "provider" => "huggingface", "status" => "hit")
                .increment(1);
            return Ok(page);
        }
        metrics::counter!("model_search.cache", "provider" => "huggingface", "status" => "miss")
            .increment(1);

        let _permit = self.gate.acquire().await;
        let url = UrlBuilder::new(format!("{BASE_URL}/api/models"))
            .add_num("limit", limit)
            .add("full", "true")
            .add("search", &query.query)
            .add("cursor", &query.cursor)
            .build();
        let (models, next_cursor) = self.fetch_search(&url).await?;

        let items: Vec<ModelResult> = models
            .iter()
            .filter_map(normalize_hf_model)
            .filter(common::is_complete_result)
            .collect();

        let page = SearchPage {
            mode: PagingMode::Cursor,
            page: 1,
            total_pages: 1,
            has_more: None,
            next_cursor,
            total_items: items.len() as u64,
            items,
        };
        self.cache.insert(key, page.clone());
        Ok(page)
    }

    async fn list_files(&self, model_id: &str, limit: u32) -> Result<FileListing> {
        let trimmed = model_id.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::InvalidRequest("Missing modelId.".to_string()));
        }
        // limit 0 selects the default listing size.
        let limit = if limit == 0 {
            DEFAULT_FILE_LIMIT
        } else {
            limit.clamp(1, MAX_FILE_LIMIT)
        };

        let key = format!("huggingface:files:{trimmed}:{limit}");
        if let Some(listing) = self.files_cache.get(&key) {
            return Ok(listing);
        }

        let _permit = self.gate.acquire().await;
        let url = format!(
            "{BASE_URL}/api/models/{}?full=true",
            encode_repo_path(trimmed)
        );
        let model: HfModel = common::fetch_json(self.http.as_ref(), PROVIDER, &url).await?;

        let mut files = Vec::new();
        for sibling in model.siblings() {
            if files.len() >= limit as usize {
                break;
            }
            if sibling.rfilename.trim().is_empty() {
                continue;
            }
            files.push(DownloadFile {
                file_name: sibling.rfilename.clone(),
                download_url: resolve_url(trimmed, &sibling.rfilename),
                file_size: sibling.size,
            });
        }
        let truncated = model.siblings().len() > files.len();

        let listing = FileListing {
            model_id: trimmed.to_string(),
            files,
            truncated,
        };
        self.files_cache.insert(key, listing.clone());
        Ok(listing)
    }

    async fn preview_image(&self, model_id: &str) -> Result<String> {
        let trimmed = model_id.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::InvalidRequest("Missing modelId.".to_string()));
        }
        let _permit = self.gate.acquire().await;

        for name in ROOT_PREVIEW_FILES {
            let image = self.try_inline_image(&resolve_url(trimmed, name)).await;
            if !image.is_empty() {
                return Ok(image);
            }
        }

        if let Some(image) = self.preview_from_siblings(trimmed).await {
            return Ok(image);
        }

        self.preview_from_readme(trimmed).await
    }
}

/// Flatten one Hub repo record into the canonical result shape. Returns
/// `None` when the record has no usable repo id.
fn normalize_hf_model(model: &HfModel) -> Option<ModelResult> {
    let model_id = model
        .model_id
        .as_deref()
        .or(model.id.as_deref())
        .unwrap_or_default();
    if model_id.trim().is_empty() {
        return None;
    }

    let description = model
        .description
        .clone()
        .or_else(|| {
            model
                .card_data
                .as_ref()
                .and_then(|card| card.description.clone())
        })
        .unwrap_or_default();

    let mut options = Vec::new();
    for sibling in model.siblings() {
        if sibling.rfilename.trim().is_empty() || !common::is_model_file(&sibling.rfilename) {
            continue;
        }
        options.push(DownloadFile {
            file_name: sibling.rfilename.clone(),
            download_url: resolve_url(model_id, &sibling.rfilename),
            file_size: sibling.size,
        });
        if options.len() >= MAX_DOWNLOAD_OPTIONS {
            break;
        }
    }
    let (download_url, file_name, file_size) = match options.first() {
        Some(first) => (
            first.download_url.clone(),
            first.file_name.clone(),
            first.file_size,
        ),
        None => (String::new(), String::new(), None),
    };

    Some(ModelResult {
        model_id: model_id.to_string(),
        model_version_id: String::new(),
        name: model_id.to_string(),
        model_type: "HuggingFace".to_string(),
        description,
        creator: model.author.clone(),
        downloads: model.downloads,
        version_name: model.last_modified.clone(),
        base_model: String::new(),
        image: String::new(),
        download_url,
        download_id: String::new(),
        file_name,
        file_size,
        open_url: format!("{BASE_URL}/{model_id}"),
        download_options: if options.is_empty() {
            None
        } else {
            Some(options)
        },
    })
}

/// Direct-download URL for a file in a repo. The repo id goes in raw (the Hub
/// rejects an encoded slash there); only the filename is encoded.
fn resolve_url(model_id: &str, filename: &str) -> String {
    format!(
        "{BASE_URL}/{model_id}/resolve/main/{}",
        urlencoding::encode(filename)
    )
}

/// Encode a repo id for the `/api/models/{id}` path, keeping the
/// owner/repo slash itself unencoded.
fn encode_repo_path(model_id: &str) -> String {
    model_id
        .split('/')
        .filter(|part| !part.is_empty())
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Pull the `cursor` query parameter out of a `Link` header's `rel="next"`
/// entry, e.g. `<https://huggingface.co/api/models?cursor=...>; rel="next"`.
fn parse_link_cursor(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        if !part.to_ascii_lowercase().contains(r#"rel="next""#) {
            return None;
        }
        let start = part.find('<')?;
        let end = part.find('>')?;
        if end <= start {
            return None;
        }
        common::query_param(&part[start + 1..end], "cursor")
    })
}

fn markdown_image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)!\[[^\]]*\]\(([^)\s]+)(?:\s+[^)]*)?\)").expect("valid regex")
    })
}

fn html_image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<img[^>]*?\s+src\s*=\s*["']([^"']+)["'][^>]*>"#).expect("valid regex")
    })
}

/// Every image URL referenced by a README, Markdown syntax first, then HTML
/// `<img>` tags, in document order within each group.
fn readme_image_candidates(markdown: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    for capture in markdown_image_regex().captures_iter(markdown) {
        if let Some(url) = capture.get(1) {
            candidates.push(url.as_str().to_string());
        }
    }
    for capture in html_image_regex().captures_iter(markdown) {
        if let Some(url) = capture.get(1) {
            candidates.push(url.as_str().to_string());
        }
    }
    candidates
}

/// Resolve a README image reference to an absolute URL. Absolute URLs pass
/// through, protocol-relative ones get `https:`, site-absolute paths anchor
/// at huggingface.co, and repo-relative paths resolve against the repo's
/// `main` branch. Fragments and query strings are stripped from relative
/// paths. `data:` URLs and unresolvable values come back empty.
fn normalize_readme_image_url(model_id: &str, raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return raw.to_string();
    }
    if lower.starts_with("data:") {
        return String::new();
    }
    if raw.starts_with("//") {
        return format!("https:{raw}");
    }

    let mut rel = raw;
    if let Some(hash) = rel.find('#') {
        rel = &rel[..hash];
    }
    if let Some(question) = rel.find('?') {
        rel = &rel[..question];
    }
    let rel = rel.trim();
    if rel.is_empty() {
        return String::new();
    }
    if let Some(site_path) = rel.strip_prefix('/') {
        return format!("https://huggingface.co/{site_path}");
    }
    let rel = rel.strip_prefix("./").unwrap_or(rel);
    resolve_url(model_id, rel)
}

fn is_trusted_image_host(raw_url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(raw_url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    TRUSTED_IMAGE_HOSTS
        .iter()
        .any(|trusted| host == *trusted || host.ends_with(&format!(".{trusted}")))
}

/// Fallback content type when the upstream does not send one.
fn infer_content_type(url: &str) -> &'static str {
    let lower = url.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else {
        "image/png"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HfModel {
    model_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    author: String,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    last_modified: String,
    description: Option<String>,
    card_data: Option<HfCardData>,
    /// Absent (or null) for repos whose file list is hidden.
    #[serde(default)]
    siblings: Option<Vec<HfSibling>>,
}

impl HfModel {
    fn siblings(&self) -> &[HfSibling] {
        self.siblings.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct HfCardData {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HfSibling {
    #[serde(default)]
    rfilename: String,
    #[serde(default)]
    size: Option<u64>,
}
