//! Search orchestration: provider resolution, uniform envelope rendering, and
//! the download handoff.
//!
//! This is the boundary the host application talks to. Provider errors stop
//! here: every `Err` coming up from a provider is rendered as a
//! `{success:false, error}` envelope, so callers never see a Rust error type
//! or a panic on the wire.

use crate::api::{
    DownloadHandoff, FileListingEnvelope, FilterOptionsEnvelope, ImageEnvelope, ProviderInfo,
    SearchEnvelope, SearchQuery,
};
use crate::error::{ProviderError, Result};
use crate::featured::{self, FeaturedModel};
use crate::host::{DownloadSink, HostHttp, UserSession};
use crate::imagequeue::ImageSource;
use crate::provider::civitai::CivitaiProvider;
use crate::provider::hartsy::HartsyProvider;
use crate::provider::huggingface::HuggingFaceProvider;
use crate::registry::ProviderRegistry;
use crate::traits::SearchProvider;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// The aggregation service: one instance per process, shared across sessions.
///
/// Obtain it via [`SearchService::builder()`]. Providers are resolved by id on
/// every call; per-request state (page numbers, cursor stacks) lives with the
/// caller, typically in a [`SearchPager`](crate::pager::SearchPager).
pub struct SearchService {
    registry: ProviderRegistry,
    sink: Option<Arc<dyn DownloadSink>>,
}

impl SearchService {
    pub fn builder() -> SearchServiceBuilder {
        SearchServiceBuilder::default()
    }

    /// Execute a search against one provider and render the uniform envelope.
    #[tracing::instrument(skip(self, session, query))]
    pub async fn search(
        &self,
        session: &dyn UserSession,
        provider_id: &str,
        query: &SearchQuery,
    ) -> SearchEnvelope {
        let provider = match self.registry.get(provider_id) {
            Ok(provider) => provider,
            Err(err) => {
                metrics::counter!("model_search.requests", "provider" => provider_id.to_string(), "status" => "failure")
                    .increment(1);
                tracing::warn!(error = %err, "search rejected");
                return SearchEnvelope::failure(err);
            }
        };

        let start = Instant::now();
        let outcome = provider.search(session, query).await;
        metrics::histogram!("model_search.duration_seconds", "provider" => provider.provider_id())
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(page) => {
                metrics::counter!("model_search.requests", "provider" => provider.provider_id(), "status" => "success")
                    .increment(1);
                SearchEnvelope::ok(page)
            }
            Err(err) => {
                metrics::counter!("model_search.requests", "provider" => provider.provider_id(), "status" => "failure")
                    .increment(1);
                tracing::warn!(provider = provider.provider_id(), error = %err, "search failed");
                SearchEnvelope::failure(err)
            }
        }
    }

    /// Categorical filter values for one provider's filter UI.
    #[tracing::instrument(skip(self, _session))]
    pub async fn filter_options(
        &self,
        _session: &dyn UserSession,
        provider_id: &str,
    ) -> FilterOptionsEnvelope {
        let provider = match self.registry.get(provider_id) {
            Ok(provider) => provider,
            Err(err) => return FilterOptionsEnvelope::failure(err),
        };
        match provider.filter_options().await {
            Ok(options) => FilterOptionsEnvelope::ok(options),
            Err(err) => {
                tracing::warn!(provider = provider.provider_id(), error = %err, "filter discovery failed");
                FilterOptionsEnvelope::failure(err)
            }
        }
    }

    /// Full file inventory of one model.
    #[tracing::instrument(skip(self, _session))]
    pub async fn list_files(
        &self,
        _session: &dyn UserSession,
        provider_id: &str,
        model_id: &str,
        limit: u32,
    ) -> FileListingEnvelope {
        let provider = match self.registry.get(provider_id) {
            Ok(provider) => provider,
            Err(err) => return FileListingEnvelope::failure(err),
        };
        match provider.list_files(model_id, limit).await {
            Ok(listing) => FileListingEnvelope::ok(listing),
            Err(err) => {
                tracing::warn!(provider = provider.provider_id(), error = %err, "file listing failed");
                FileListingEnvelope::failure(err)
            }
        }
    }

    /// Lazily resolve one model's preview image.
    #[tracing::instrument(skip(self))]
    pub async fn preview_image(&self, provider_id: &str, model_id: &str) -> ImageEnvelope {
        let provider = match self.registry.get(provider_id) {
            Ok(provider) => provider,
            Err(err) => return ImageEnvelope::failure(err),
        };
        match provider.preview_image(model_id).await {
            Ok(image) => ImageEnvelope::ok(image),
            Err(err) => {
                tracing::warn!(provider = provider.provider_id(), error = %err, "preview resolution failed");
                ImageEnvelope::failure(err)
            }
        }
    }

    /// Capability descriptions of every registered provider, in registration
    /// order.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.registry.iter().map(|provider| provider.info()).collect()
    }

    /// Hand a chosen result off to the external downloader.
    pub async fn submit_download(&self, handoff: DownloadHandoff) -> Result<()> {
        let sink = self.sink.as_ref().ok_or_else(|| {
            ProviderError::InvalidRequest("No download sink is configured.".to_string())
        })?;
        tracing::info!(name = %handoff.name, url = %handoff.url, "handing off download");
        sink.enqueue(handoff).await
    }

    /// The static curated catalog.
    pub fn featured(&self) -> &'static [FeaturedModel] {
        featured::catalog()
    }
}

#[async_trait]
impl ImageSource for SearchService {
    async fn resolve_image(&self, provider_id: &str, model_id: &str) -> Result<String> {
        let provider = self.registry.get(provider_id)?;
        provider.preview_image(model_id).await
    }
}

/// Builder for a [`SearchService`].
#[derive(Default)]
pub struct SearchServiceBuilder {
    registry: ProviderRegistry,
    sink: Option<Arc<dyn DownloadSink>>,
}

impl SearchServiceBuilder {
    /// Register a provider. Its [`provider_id`](SearchProvider::provider_id)
    /// is the lookup key; registering a second provider with the same id
    /// replaces the first.
    pub fn register_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.registry.register(provider);
        self
    }

    /// Register the three stock providers (CivitAI, Hugging Face, Hartsy) on
    /// the given HTTP transport, in that listing order.
    pub fn with_default_providers(self, http: Arc<dyn HostHttp>) -> Self {
        self.register_provider(Arc::new(CivitaiProvider::new(http.clone())))
            .register_provider(Arc::new(HuggingFaceProvider::new(http.clone())))
            .register_provider(Arc::new(HartsyProvider::new(http)))
    }

    /// Attach the external download sink. Without one,
    /// [`submit_download`](SearchService::submit_download) rejects every
    /// handoff.
    pub fn download_sink(mut self, sink: Arc<dyn DownloadSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Arc<SearchService> {
        Arc::new(SearchService {
            registry: self.registry,
            sink: self.sink,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ModelResult;
    use crate::mock::{MockHttp, MockProvider, MockSession, MockSink, page_fixture};

    fn result_fixture() -> ModelResult {
        ModelResult {
            model_id: "77".to_string(),
            name: "Fixture".to_string(),
            model_type: "LoRA".to_string(),
            download_url: "https://example.com/files/77.safetensors".to_string(),
            file_name: "77.safetensors".to_string(),
            ..ModelResult::default()
        }
    }

    #[tokio::test]
    async fn unknown_provider_renders_failure_envelopes() {
        let service = SearchService::builder().build();
        let session = MockSession::new();

        let envelope = service.search(&session, "ghost", &SearchQuery::browse(1)).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Unknown provider: ghost"));
        assert!(envelope.page.is_none());

        let filters = service.filter_options(&session, "ghost").await;
        assert!(!filters.success);
        let files = service.list_files(&session, "ghost", "m", 10).await;
        assert!(!files.success);
        let image = service.preview_image("ghost", "m").await;
        assert!(!image.success);
    }

    #[tokio::test]
    async fn search_wraps_provider_page() {
        let service = SearchService::builder()
            .register_provider(Arc::new(
                MockProvider::new("mock").with_page(page_fixture(2, 9)),
            ))
            .build();

        let envelope = service
            .search(&MockSession::new(), "mock", &SearchQuery::browse(2))
            .await;

        assert!(envelope.success);
        let page = envelope.page.unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 9);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_becomes_failure_envelope() {
        let service = SearchService::builder()
            .register_provider(Arc::new(MockProvider::new("mock").failing()))
            .build();

        let envelope = service
            .search(&MockSession::new(), "mock", &SearchQuery::text("q"))
            .await;

        assert!(!envelope.success);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Failed to contact Mock Provider.")
        );
    }

    #[tokio::test]
    async fn default_providers_listed_in_order_with_capabilities() {
        let service = SearchService::builder()
            .with_default_providers(Arc::new(MockHttp::new()))
            .build();

        let providers = service.providers();
        let ids: Vec<&str> = providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["civitai", "huggingface", "hartsy"]);

        assert_eq!(providers[0].display_name, "CivitAI");
        assert!(providers[0].supports_filters);
        assert!(providers[0].supports_nsfw);

        assert_eq!(providers[1].display_name, "Hugging Face");
        assert!(!providers[1].supports_filters);
        assert!(!providers[1].supports_nsfw);

        assert_eq!(providers[2].display_name, "Hartsy");
        assert!(providers[2].supports_filters);
        assert!(!providers[2].supports_nsfw);
    }

    #[tokio::test]
    async fn filter_options_unsupported_is_rendered_not_thrown() {
        let service = SearchService::builder()
            .register_provider(Arc::new(MockProvider::new("mock")))
            .build();

        let envelope = service.filter_options(&MockSession::new(), "mock").await;
        assert!(!envelope.success);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Mock Provider does not support filter options")
        );
    }

    #[tokio::test]
    async fn download_handoff_reaches_the_sink() {
        let sink = Arc::new(MockSink::new());
        let service = SearchService::builder().download_sink(sink.clone()).build();

        let handoff = DownloadHandoff::for_primary_file(&result_fixture()).unwrap();
        service.submit_download(handoff).await.unwrap();

        let seen = sink.handoffs();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, "Fixture");
        assert_eq!(seen[0].url, "https://example.com/files/77.safetensors");
    }

    #[tokio::test]
    async fn download_without_sink_is_rejected() {
        let service = SearchService::builder().build();
        let handoff = DownloadHandoff::for_primary_file(&result_fixture()).unwrap();

        let err = service.submit_download(handoff).await.unwrap_err();
        assert_eq!(err.to_string(), "No download sink is configured.");
    }

    #[tokio::test]
    async fn failing_sink_error_propagates() {
        let service = SearchService::builder()
            .download_sink(Arc::new(MockSink::failing()))
            .build();

        let handoff = DownloadHandoff::for_primary_file(&result_fixture()).unwrap();
        assert!(service.submit_download(handoff).await.is_err());
    }

    #[tokio::test]
    async fn service_is_an_image_source() {
        let service = SearchService::builder()
            .register_provider(Arc::new(
                MockProvider::new("mock").with_image("m5", "https://img/m5.png"),
            ))
            .build();

        let image = service.resolve_image("mock", "m5").await.unwrap();
        assert_eq!(image, "https://img/m5.png");
        assert!(service.resolve_image("ghost", "m5").await.is_err());
    }

    #[tokio::test]
    async fn featured_catalog_is_served_statically() {
        let service = SearchService::builder().build();
        let featured = service.featured();
        assert!(!featured.is_empty());
        assert!(featured.iter().any(|model| model.is_recommended));
    }
}
