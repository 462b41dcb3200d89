use std::collections::HashMap;
use std::sync::Arc;

use perscan_core::{Platform, SourcesConfig};

use crate::app_store::AppStoreSource;
use crate::error::SourceError;
use crate::google_play::GooglePlaySource;
use crate::product_hunt::ProductHuntSource;
use crate::reddit::RedditSource;
use crate::source::ReviewSource;
use crate::youtube::YouTubeSource;

/// One [`ReviewSource`] per platform.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<Platform, Arc<dyn ReviewSource>>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the production fetcher for every platform.
    ///
    /// Sources that need a credential are registered even when it is missing;
    /// they report the missing key per request instead.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &SourcesConfig) -> Result<Self, SourceError> {
        let mut registry = Self::new();
        registry.register(Arc::new(GooglePlaySource::new(config)?));
        registry.register(Arc::new(AppStoreSource::new(config)?));
        registry.register(Arc::new(YouTubeSource::new(config)?));
        registry.register(Arc::new(ProductHuntSource::new(config)?));
        registry.register(Arc::new(RedditSource::new(config)?));
        Ok(registry)
    }

    /// Adds `source`, replacing any source already registered for its platform.
    pub fn register(&mut self, source: Arc<dyn ReviewSource>) {
        self.sources.insert(source.platform(), source);
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn ReviewSource>> {
        self.sources.get(&platform).cloned()
    }

    /// Registered platforms in canonical order.
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.sources.contains_key(p))
            .collect()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_registers_every_platform() {
        let registry = SourceRegistry::from_config(&SourcesConfig::default()).unwrap();
        assert_eq!(registry.platforms(), Platform::ALL.to_vec());
        let youtube = registry.get(Platform::YouTube).unwrap();
        assert_eq!(youtube.platform(), Platform::YouTube);
    }

    #[test]
    fn empty_registry_has_no_sources() {
        let registry = SourceRegistry::new();
        assert!(registry.get(Platform::Reddit).is_none());
        assert!(registry.platforms().is_empty());
    }
}
