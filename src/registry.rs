//! Fixed, ordered collection of search providers.

use crate::error::{ProviderError, Result};
use crate::traits::SearchProvider;
use std::collections::HashMap;
use std::sync::Arc;

/// Provider collection keyed by [`provider_id`](SearchProvider::provider_id).
///
/// Iteration order is registration order, which is also the order provider
/// pickers display. Registering a second provider under an id already present
/// replaces the instance but keeps its position.
#[derive(Default)]
pub struct ProviderRegistry {
    order: Vec<&'static str>,
    providers: HashMap<&'static str, Arc<dyn SearchProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn SearchProvider>) {
        let id = provider.provider_id();
        if self.providers.insert(id, provider).is_none() {
            self.order.push(id);
        }
    }

    /// Look up a provider by id, exact match after trimming whitespace.
    pub fn get(&self, id: &str) -> Result<Arc<dyn SearchProvider>> {
        let id = id.trim();
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::ProviderNotFound(id.to_string()))
    }

    /// Providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SearchProvider>> {
        self.order.iter().filter_map(|id| self.providers.get(id))
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
