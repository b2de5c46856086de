//! Provider implementations, one sub-module per external service.
//!
//! | Module | Service | Pagination |
//! |--------|---------|------------|
//! | `civitai` | [CivitAI](https://civitai.com) | page for browsing, cursor for free-text search |
//! | `huggingface` | [Hugging Face Hub](https://huggingface.co) | cursor (from the `Link` response header) |
//! | `hartsy` | [Hartsy](https://hartsy.ai) | page with a has-more flag |
//!
//! Each module owns its endpoint construction, auth injection, wire DTOs, and
//! pagination-mode decision; nothing provider-specific leaks past the
//! [`SearchProvider`](crate::traits::SearchProvider) boundary.

pub(crate) mod common;

pub mod civitai;
pub mod hartsy;
pub mod huggingface;

// Re-exports (same order as module declarations above).
pub use civitai::CivitaiProvider;
pub use hartsy::HartsyProvider;
pub use huggingface::HuggingFaceProvider;
