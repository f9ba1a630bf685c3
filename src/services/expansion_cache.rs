use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    models::{Provider, ProviderId, ProviderIds},
    services::provider_identity::expand_providers,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExpansionKey {
    seed: Vec<ProviderId>,
    catalog_version: String,
}

/// Memo of provider-set expansions keyed by (seed ids, catalog version).
///
/// Expansion is pure, so a hit is always equivalent to recomputing. Callers
/// without a catalog version bypass the memo. The memo is cleared when it
/// reaches capacity.
#[derive(Clone)]
pub struct ExpansionCache {
    entries: Arc<RwLock<HashMap<ExpansionKey, ProviderIds>>>,
    capacity: usize,
}

impl ExpansionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    pub async fn get_or_expand(
        &self,
        seed: &ProviderIds,
        catalog: &[Provider],
        catalog_version: Option<&str>,
    ) -> ProviderIds {
        let Some(version) = catalog_version.filter(|_| self.capacity > 0) else {
            return expand_providers(seed, catalog);
        };

        let key = ExpansionKey {
            seed: seed.iter().copied().collect(),
            catalog_version: version.to_string(),
        };

        if let Some(hit) = self.entries.read().await.get(&key) {
            tracing::debug!(catalog_version = %version, seed = seed.len(), "Expansion cache hit");
            return hit.clone();
        }

        tracing::debug!(catalog_version = %version, seed = seed.len(), "Expansion cache miss");
        let expanded = expand_providers(seed, catalog);

        let mut entries = self.entries.write().await;
        if entries.len() >= self.capacity {
            tracing::info!(entries = entries.len(), "Expansion cache full, clearing");
            entries.clear();
        }
        entries.insert(key, expanded.clone());

        expanded
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[ProviderId]) -> ProviderIds {
        values.iter().copied().collect()
    }

    fn catalog() -> Vec<Provider> {
        vec![
            Provider::new(8, "Netflix"),
            Provider::new(175, "Netflix Kids"),
            Provider::new(337, "Disney Plus"),
        ]
    }

    #[tokio::test]
    async fn test_cache_memoizes_by_version() {
        let cache = ExpansionCache::new(8);
        let first = cache.get_or_expand(&ids(&[8]), &catalog(), Some("v1")).await;
        assert_eq!(first, ids(&[8, 175]));
        assert_eq!(cache.len().await, 1);

        // Same key returns the memoized set even if the catalog argument differs
        let second = cache.get_or_expand(&ids(&[8]), &[], Some("v1")).await;
        assert_eq!(second, first);
        assert_eq!(cache.len().await, 1);

        let bumped = cache.get_or_expand(&ids(&[8]), &[], Some("v2")).await;
        assert_eq!(bumped, ids(&[8]));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_cache_bypassed_without_version() {
        let cache = ExpansionCache::new(8);
        let expanded = cache.get_or_expand(&ids(&[8]), &catalog(), None).await;
        assert_eq!(expanded, ids(&[8, 175]));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_clears_when_full() {
        let cache = ExpansionCache::new(2);
        cache.get_or_expand(&ids(&[8]), &catalog(), Some("v1")).await;
        cache.get_or_expand(&ids(&[337]), &catalog(), Some("v1")).await;
        assert_eq!(cache.len().await, 2);

        cache.get_or_expand(&ids(&[175]), &catalog(), Some("v1")).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_disables_cache() {
        let cache = ExpansionCache::new(0);
        cache.get_or_expand(&ids(&[8]), &catalog(), Some("v1")).await;
        assert!(cache.is_empty().await);
    }
}
