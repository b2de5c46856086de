#![allow(dead_code)]

//! Mock implementations for testing
//!
//! Canned-response doubles for the host seams (HTTP, session, download sink)
//! plus a configurable provider. All types are gated with `#[cfg(test)]`.

use crate::api::{DownloadHandoff, PagingStrategy, SearchPage, SearchQuery};
use crate::error::{ProviderError, Result};
use crate::host::{DownloadSink, FetchError, FetchedResponse, HostHttp, UserSession};
use crate::traits::SearchProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Canned-response HTTP host routed by URL substring.
///
/// Routes match in registration order; a URL matching no route fails like a
/// dead network, which is exactly how "upstream unreachable" paths get
/// exercised.
pub struct MockHttp {
    routes: Vec<(String, FetchedResponse)>,
    calls: AtomicU32,
    requests: Mutex<Vec<String>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve `response` for any URL containing `url_part`.
    pub fn with_response(mut self, url_part: &str, response: FetchedResponse) -> Self {
        self.routes.push((url_part.to_string(), response));
        self
    }

    /// Shorthand for a 200 JSON body.
    pub fn with_json(self, url_part: &str, body: &str) -> Self {
        self.with_response(url_part, FetchedResponse::new(200, body))
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// All requested URLs, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent requested URL.
    pub fn last_request(&self) -> Option<String> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockHttp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostHttp for MockHttp {
    async fn get(&self, url: &str) -> std::result::Result<FetchedResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url.to_string());
        for (part, response) in &self.routes {
            if url.contains(part.as_str()) {
                return Ok(response.clone());
            }
        }
        Err(FetchError(format!("no mock route for {url}")))
    }
}

/// Session double with configurable permission and stored keys.
pub struct MockSession {
    nsfw_allowed: bool,
    keys: HashMap<String, String>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            nsfw_allowed: false,
            keys: HashMap::new(),
        }
    }

    pub fn with_nsfw_permission(mut self) -> Self {
        self.nsfw_allowed = true;
        self
    }

    pub fn with_api_key(mut self, provider_id: &str, key: &str) -> Self {
        self.keys.insert(provider_id.to_string(), key.to_string());
        self
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UserSession for MockSession {
    fn has_nsfw_permission(&self) -> bool {
        self.nsfw_allowed
    }

    fn api_key(&self, provider_id: &str) -> Option<String> {
        self.keys.get(provider_id).cloned()
    }
}

/// Download sink that records every handoff.
pub struct MockSink {
    handoffs: Mutex<Vec<DownloadHandoff>>,
    fail: bool,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            handoffs: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            handoffs: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn handoffs(&self) -> Vec<DownloadHandoff> {
        self.handoffs.lock().unwrap().clone()
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadSink for MockSink {
    async fn enqueue(&self, handoff: DownloadHandoff) -> Result<()> {
        if self.fail {
            return Err(ProviderError::InvalidRequest(
                "Mock sink failure".to_string(),
            ));
        }
        self.handoffs.lock().unwrap().push(handoff);
        Ok(())
    }
}

/// Configurable provider double for service, pager, and image-queue tests.
pub struct MockProvider {
    id: &'static str,
    strategy: PagingStrategy,
    result_page: SearchPage,
    fail_search: bool,
    images: HashMap<String, String>,
    preview_delay_ms: u64,
    search_count: AtomicU32,
    preview_count: AtomicU32,
}

impl MockProvider {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            strategy: PagingStrategy::PageTotal,
            result_page: SearchPage {
                mode: PagingStrategy::PageTotal.mode(),
                page: 1,
                total_pages: 1,
                has_more: None,
                next_cursor: None,
                total_items: 0,
                items: Vec::new(),
            },
            fail_search: false,
            images: HashMap::new(),
            preview_delay_ms: 0,
            search_count: AtomicU32::new(0),
            preview_count: AtomicU32::new(0),
        }
    }

    pub fn with_strategy(mut self, strategy: PagingStrategy) -> Self {
        self.strategy = strategy;
        self.result_page.mode = strategy.mode();
        self
    }

    /// Template page returned by every search, with `page` echoed from the
    /// request.
    pub fn with_page(mut self, page: SearchPage) -> Self {
        self.result_page = page;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn with_image(mut self, model_id: &str, image: &str) -> Self {
        self.images.insert(model_id.to_string(), image.to_string());
        self
    }

    pub fn with_preview_delay(mut self, delay_ms: u64) -> Self {
        self.preview_delay_ms = delay_ms;
        self
    }

    pub fn search_count(&self) -> u32 {
        self.search_count.load(Ordering::SeqCst)
    }

    pub fn preview_count(&self) -> u32 {
        self.preview_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    fn provider_id(&self) -> &'static str {
        self.id
    }

    fn display_name(&self) -> &'static str {
        "Mock Provider"
    }

    fn supports_filters(&self) -> bool {
        true
    }

    fn supports_nsfw(&self) -> bool {
        false
    }

    fn paging(&self, _query: &SearchQuery) -> PagingStrategy {
        self.strategy
    }

    async fn search(&self, _session: &dyn UserSession, query: &SearchQuery) -> Result<SearchPage> {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(ProviderError::Unreachable {
                provider: "Mock Provider",
            });
        }
        let mut page = self.result_page.clone();
        if !self.strategy.is_cursor() {
            page.page = query.page;
        }
        Ok(page)
    }

    async fn preview_image(&self, model_id: &str) -> Result<String> {
        self.preview_count.fetch_add(1, Ordering::SeqCst);
        if self.preview_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.preview_delay_ms)).await;
        }
        Ok(self.images.get(model_id).cloned().unwrap_or_default())
    }
}

/// A one-item page for tests that only care about paging fields.
pub fn page_fixture(page: u32, total_pages: u32) -> SearchPage {
    SearchPage {
        mode: crate::api::PagingMode::Page,
        page,
        total_pages,
        has_more: None,
        next_cursor: None,
        total_items: u64::from(total_pages) * 24,
        items: vec![crate::api::ModelResult {
            model_id: "fixture".to_string(),
            name: "Fixture Model".to_string(),
            model_type: "Checkpoint".to_string(),
            download_url: "https://example.com/files/1".to_string(),
            file_name: "fixture.safetensors".to_string(),
            ..crate::api::ModelResult::default()
        }],
    }
}
