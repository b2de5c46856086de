//! Unified Rust search layer for generative-AI model catalogs.
//!
//! Modelscout provides a single, provider-agnostic API for searching,
//! browsing, and fetching download metadata for models across several
//! upstream catalogs (CivitAI, the Hugging Face Hub, Hartsy), normalizing
//! their very different wire formats, pagination schemes, and filter
//! vocabularies into one result shape.
//!
//! # Key concepts
//!
//! - **[`SearchService`](service::SearchService)** — the central service that
//!   owns providers and renders every outcome as a JSON-friendly envelope
//!   (`{"success": false, ...}` rather than a panic or a bare error).
//! - **[`SearchProvider`](traits::SearchProvider)** — the per-catalog backend
//!   trait. Each provider owns its endpoint construction, auth injection,
//!   wire DTOs, and pagination policy.
//! - **[`ModelResult`](api::ModelResult)** — the canonical model record every
//!   provider normalizes into, regardless of upstream shape.
//! - **[`SearchPager`](pager::SearchPager)** — caller-side navigation state:
//!   page numbers for page-mode providers, a cursor stack for cursor-mode
//!   providers, and filter-change detection.
//! - **[`ImagePreviewQueue`](imagequeue::ImagePreviewQueue)** — a small
//!   worker pool that resolves preview images off the hot path, deduplicating
//!   in-flight lookups and caching per model.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use modelscout::api::SearchQuery;
//! use modelscout::host::{AnonymousSession, ReqwestHttp};
//! use modelscout::service::SearchService;
//!
//! # async fn example() {
//! let service = SearchService::builder()
//!     .with_default_providers(Arc::new(ReqwestHttp::new()))
//!     .build();
//!
//! let envelope = service
//!     .search(&AnonymousSession, "civitai", &SearchQuery::text("dreamshaper"))
//!     .await;
//! if let Some(page) = &envelope.page {
//!     for model in &page.items {
//!         println!("{} by {}", model.name, model.creator);
//!     }
//! }
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod error;
pub mod featured;
pub mod gate;
pub mod host;
pub mod imagequeue;
pub mod pager;
pub mod provider;
pub mod registry;
pub mod service;
pub mod traits;

#[cfg(test)]
mod mock;
