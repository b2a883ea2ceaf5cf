//! Feature Context

use crate::{FeatureRegistry, PluginRegistry};
use featurekit_core::{FeatureConfig, FeatureDefinition};
use serde_json::Value as JsonValue;

/// Read-only view passed to a feature at runtime
pub struct FeatureContext<'r, C> {
    pub feature_id: &'r str,
    pub config: &'r FeatureConfig,
    pub registry: &'r PluginRegistry<C>,
}

impl<'r, C> FeatureContext<'r, C> {
    pub fn new(feature: &'r FeatureDefinition<C>, registry: &'r PluginRegistry<C>) -> Self {
        Self {
            feature_id: &feature.id,
            config: &feature.config,
            registry,
        }
    }

    pub fn config_value(&self, key: &str) -> Option<&'r JsonValue> {
        self.config.get(key)
    }

    /// True when `dep` is registered and enabled
    pub fn dependency_ready(&self, dep: &str) -> bool {
        self.registry.get_feature(dep).is_some_and(|f| f.enabled)
    }

    /// True when every declared dependency is ready
    pub fn dependencies_ready(&self) -> bool {
        self.registry
            .get_feature(self.feature_id)
            .is_some_and(|f| f.dependencies.iter().all(|d| self.dependency_ready(d)))
    }
}
