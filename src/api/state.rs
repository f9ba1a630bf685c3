use std::sync::Arc;

use crate::{
    config::Config,
    services::{AvailabilityService, ExpansionCache},
};

/// Shared application state; everything inside is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub expansion_cache: ExpansionCache,
    pub availability: AvailabilityService,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let expansion_cache = ExpansionCache::new(config.expansion_cache_capacity);

        Self {
            config: Arc::new(config.clone()),
            availability: AvailabilityService::new(expansion_cache.clone()),
            expansion_cache,
        }
    }
}
