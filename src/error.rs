//! Error types for the model search layer.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Unified error type covering request validation, provider lookup, and
/// upstream failures.
///
/// The [`Display`](std::fmt::Display) strings of the upstream variants are the
/// exact messages surfaced to clients inside response envelopes, so changing
/// them is a wire-visible change.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested provider ID is not registered with the service.
    #[error("Unknown provider: {0}")]
    ProviderNotFound(String),

    /// The caller passed an invalid or incomplete request.
    #[error("{0}")]
    InvalidRequest(String),

    /// The provider does not implement the requested operation.
    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },

    /// The upstream API answered with a non-success HTTP status. `body` holds
    /// the response text truncated to 500 characters.
    #[error("{provider} error {status}: {body}")]
    UpstreamStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The upstream API could not be reached (DNS, connect, TLS, timeout).
    #[error("Failed to contact {provider}.")]
    Unreachable { provider: &'static str },

    /// The upstream API answered 2xx but the payload failed to parse.
    #[error("{provider} returned invalid data.")]
    InvalidData { provider: &'static str },
}

impl ProviderError {
    /// Returns `true` when the failure originated upstream ([`UpstreamStatus`](Self::UpstreamStatus),
    /// [`Unreachable`](Self::Unreachable), [`InvalidData`](Self::InvalidData))
    /// rather than from the caller's request.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamStatus { .. } | Self::Unreachable { .. } | Self::InvalidData { .. }
        )
    }
}
