#![allow(dead_code)]

//! Shared doubles and canned upstream fixtures for integration tests.

use async_trait::async_trait;
use modelscout::api::DownloadHandoff;
use modelscout::error::{ProviderError, Result};
use modelscout::host::{DownloadSink, FetchError, FetchedResponse, HostHttp, UserSession};
use modelscout::service::SearchService;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Canned-response HTTP fetcher routed by URL substring, matching in
/// registration order. A URL with no route fails like a dead network.
pub struct MockFetcher {
    routes: Vec<(String, FetchedResponse)>,
    calls: AtomicU32,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
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

    /// A 200 JSON body carrying a `Link` response header.
    pub fn with_linked_json(self, url_part: &str, body: &str, link: &str) -> Self {
        let mut response = FetchedResponse::new(200, body);
        response.link = Some(link.to_string());
        self.with_response(url_part, response)
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// All requested URLs, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostHttp for MockFetcher {
    async fn get(&self, url: &str) -> std::result::Result<FetchedResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url.to_string());
        for (part, response) in &self.routes {
            if url.contains(part.as_str()) {
                return Ok(response.clone());
            }
        }
        Err(FetchError(format!("no fixture route for {url}")))
    }
}

/// Session double with configurable NSFW permission and stored API keys.
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

impl UserSession for MockSession {
    fn has_nsfw_permission(&self) -> bool {
        self.nsfw_allowed
    }

    fn api_key(&self, provider_id: &str) -> Option<String> {
        self.keys.get(provider_id).cloned()
    }
}

/// Download sink recording every handoff it receives.
pub struct MockSink {
    handoffs: Mutex<Vec<DownloadHandoff>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            handoffs: Mutex::new(Vec::new()),
        }
    }

    pub fn handoffs(&self) -> Vec<DownloadHandoff> {
        self.handoffs.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadSink for MockSink {
    async fn enqueue(&self, handoff: DownloadHandoff) -> Result<()> {
        self.handoffs.lock().unwrap().push(handoff);
        Ok(())
    }
}

/// Dead-letter sink: every enqueue fails.
pub struct FailingSink;

#[async_trait]
impl DownloadSink for FailingSink {
    async fn enqueue(&self, _handoff: DownloadHandoff) -> Result<()> {
        Err(ProviderError::InvalidRequest(
            "Download queue unavailable".to_string(),
        ))
    }
}

/// A service over the three default providers, a recording sink, and the
/// fetcher they all share.
pub fn service_with(
    fetcher: MockFetcher,
) -> (Arc<SearchService>, Arc<MockFetcher>, Arc<MockSink>) {
    let http = Arc::new(fetcher);
    let sink = Arc::new(MockSink::new());
    let service = SearchService::builder()
        .with_default_providers(http.clone())
        .download_sink(sink.clone())
        .build();
    (service, http, sink)
}

/// One complete CivitAI catalog record with a weight file and an image.
pub fn civitai_model(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "type": "Checkpoint",
        "description": "fixture model",
        "creator": { "username": "fixture-author" },
        "stats": { "downloadCount": 1200 },
        "modelVersions": [{
            "id": id * 10,
            "name": "v1.0",
            "baseModel": "SDXL 1.0",
            "files": [{
                "name": format!("{name}.safetensors"),
                "downloadUrl": format!("https://civitai.com/api/download/models/{}", id * 10),
                "sizeKB": 2048.0
            }],
            "images": [{ "url": format!("https://image.civitai.com/{id}.jpeg"), "type": "image" }]
        }]
    })
}

pub fn civitai_page(items: Vec<serde_json::Value>, metadata: serde_json::Value) -> String {
    json!({ "items": items, "metadata": metadata }).to_string()
}

/// One complete Hub repo record with weight and non-weight files.
pub fn hf_repo(id: &str) -> serde_json::Value {
    json!({
        "modelId": id,
        "author": "fixture-org",
        "downloads": 4321,
        "lastModified": "2025-07-15T00:00:00.000Z",
        "cardData": { "description": "fixture repo" },
        "siblings": [
            { "rfilename": "config.json", "size": 200 },
            { "rfilename": "model.safetensors", "size": 7000000 }
        ]
    })
}

/// One complete Hartsy catalog record.
pub fn hartsy_model(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "type": "lora",
        "description": "fixture model",
        "creator": "fixture-author",
        "downloads": 77,
        "version": "1.2",
        "architecture": "SDXL 1.0",
        "imageUrl": format!("https://hartsy.ai/images/{id}.png"),
        "downloadUrl": format!("https://hartsy.ai/files/{id}.safetensors"),
        "fileName": format!("{name}.safetensors"),
        "fileSize": 123456,
        "pageUrl": format!("https://hartsy.ai/models/{id}")
    })
}

pub fn hartsy_page(items: Vec<serde_json::Value>, has_more: bool, page: u32) -> String {
    json!({
        "success": true,
        "items": items,
        "hasMore": has_more,
        "page": page,
        "totalItems": 60
    })
    .to_string()
}
