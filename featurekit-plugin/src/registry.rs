//! Plugin Registry

use crate::{FeatureContext, FeatureRegistry};
use featurekit_core::{FeatureDefinition, FeatureFault, RegistryConfig, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Summary of a registered feature (no component, no config)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub dependencies: Vec<String>,
}

impl FeatureSummary {
    pub fn from_definition<C>(def: &FeatureDefinition<C>) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            version: def.version.clone(),
            enabled: def.enabled,
            dependencies: def.dependencies.clone(),
        }
    }
}

/// Snapshot of a registry for debugging and reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    pub total_features: usize,
    pub enabled_features: usize,
    pub features: Vec<FeatureSummary>,
}

/// In-memory feature registry.
///
/// Dependencies must be registered before their dependents, so the
/// depends-on graph is acyclic by construction. Lookups go through the map;
/// enumeration follows `order`.
#[derive(Debug)]
pub struct PluginRegistry<C> {
    features: HashMap<String, FeatureDefinition<C>>,
    order: Vec<String>,
    config: RegistryConfig,
}

impl<C> PluginRegistry<C> {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            features: HashMap::new(),
            order: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Builder form of `register`
    pub fn with_feature(mut self, feature: FeatureDefinition<C>) -> Result<Self, RegistryError> {
        self.register(feature)?;
        Ok(self)
    }

    /// IDs of registered features that list `id` as a dependency, in
    /// registration order
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.iter()
            .filter(|f| f.depends_on(id))
            .map(|f| f.id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDefinition<C>> {
        self.order.iter().filter_map(|id| self.features.get(id))
    }

    /// Read-only view handed to a feature at runtime
    pub fn context(&self, id: &str) -> Option<FeatureContext<'_, C>> {
        self.features.get(id).map(|f| FeatureContext::new(f, self))
    }

    /// Record a runtime fault. A critical fault switches the feature off
    /// without touching its dependents. Returns whether it was switched off.
    pub fn report_fault(&mut self, fault: &FeatureFault) -> bool {
        tracing::error!(
            feature = %fault.feature_id,
            phase = %fault.phase,
            recoverable = fault.recoverable,
            "{}", fault.message
        );

        if fault.recoverable {
            return false;
        }
        match self.features.get_mut(&fault.feature_id) {
            Some(feature) => {
                feature.enabled = false;
                tracing::warn!(feature = %fault.feature_id, "disabled feature due to critical error");
                true
            }
            None => false,
        }
    }

    fn lifecycle(&self, action: &'static str, id: &str) {
        if self.config.environment.is_development() {
            tracing::info!(feature = %id, "{}", action);
        } else {
            tracing::debug!(feature = %id, "{}", action);
        }
    }
}

impl<C> FeatureRegistry for PluginRegistry<C> {
    type Component = C;

    fn register(&mut self, feature: FeatureDefinition<C>) -> Result<(), RegistryError> {
        feature.validate_shape()?;

        // Re-registration keeps the existing entry
        if self.features.contains_key(&feature.id) {
            tracing::warn!(feature = %feature.id, "feature already registered, keeping existing registration");
            return Ok(());
        }

        if let Some(missing) = feature
            .dependencies
            .iter()
            .find(|dep| !self.features.contains_key(dep.as_str()))
        {
            return Err(RegistryError::unresolved(feature.id.clone(), missing.clone()));
        }

        let id = feature.id.clone();
        self.lifecycle("registered feature", &id);
        tracing::trace!(feature = %id, version = %feature.version, deps = feature.dependencies.len());
        self.order.push(id.clone());
        self.features.insert(id, feature);
        Ok(())
    }

    fn unregister(&mut self, id: &str) -> Result<(), RegistryError> {
        if !self.features.contains_key(id) {
            tracing::warn!(feature = %id, "attempted to unregister non-existent feature");
            return Ok(());
        }

        let dependents = self.dependents_of(id);
        if !dependents.is_empty() {
            return Err(RegistryError::dependents_exist(id, dependents));
        }

        self.features.remove(id);
        self.order.retain(|k| k != id);
        self.lifecycle("unregistered feature", id);
        Ok(())
    }

    fn is_registered(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    fn get_feature(&self, id: &str) -> Option<&FeatureDefinition<C>> {
        self.features.get(id)
    }

    fn get_all_features(&self) -> Vec<&FeatureDefinition<C>> {
        self.iter().collect()
    }

    fn enable_feature(&mut self, id: &str) -> Result<(), RegistryError> {
        let feature = self.features.get(id).ok_or_else(|| RegistryError::not_found(id))?;

        if let Some(dep) = feature
            .dependencies
            .iter()
            .find(|dep| !self.features.get(dep.as_str()).is_some_and(|d| d.enabled))
        {
            return Err(RegistryError::dependency_disabled(id, dep.clone()));
        }

        if let Some(feature) = self.features.get_mut(id) {
            feature.enabled = true;
        }
        self.lifecycle("enabled feature", id);
        Ok(())
    }

    fn disable_feature(&mut self, id: &str) -> Result<(), RegistryError> {
        if !self.features.contains_key(id) {
            return Err(RegistryError::not_found(id));
        }

        // Each feature is visited once, however many paths reach it
        let mut affected = HashSet::from([id.to_string()]);
        let mut pending = vec![id.to_string()];
        while let Some(current) = pending.pop() {
            for dependent in self.dependents_of(&current) {
                if affected.insert(dependent.clone()) {
                    pending.push(dependent);
                }
            }
        }

        // Dependents are registered after their dependencies
        for key in self.order.iter().rev().filter(|k| affected.contains(k.as_str())) {
            if let Some(feature) = self.features.get_mut(key) {
                feature.enabled = false;
            }
            self.lifecycle("disabled feature", key);
        }
        Ok(())
    }

    fn clear(&mut self) {
        if !self.config.environment.is_test() {
            tracing::warn!("clear() should only be used in tests");
        }
        self.features.clear();
        self.order.clear();
    }
}

impl<C> Default for PluginRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurekit_core::{DefinitionField, FaultPhase};

    fn feature(id: &str) -> FeatureDefinition<&'static str> {
        FeatureDefinition::new(id, format!("{} feature", id), "1.0.0", "Test", "component")
    }

    fn ids<C>(features: &[&FeatureDefinition<C>]) -> Vec<String> {
        features.iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn test_starts_empty() {
        let registry: PluginRegistry<()> = PluginRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get_all_features().is_empty());
        assert!(!registry.is_registered("test"));
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("test-feature")).unwrap();

        assert!(registry.is_registered("test-feature"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_feature("test-feature"), Some(&feature("test-feature")));
    }

    #[test]
    fn test_register_rejects_each_blank_field() {
        let mut registry = PluginRegistry::new();
        for expected in [
            DefinitionField::Id,
            DefinitionField::Name,
            DefinitionField::Version,
            DefinitionField::Description,
        ] {
            let mut def = feature("broken");
            match expected {
                DefinitionField::Id => def.id.clear(),
                DefinitionField::Name => def.name.clear(),
                DefinitionField::Version => def.version.clear(),
                DefinitionField::Description => def.description.clear(),
            }
            match registry.register(def) {
                Err(RegistryError::InvalidDefinition { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidDefinition for {}, got {:?}", expected, other),
            }
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_keeps_original() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("dup")).unwrap();

        let mut replacement = feature("dup");
        replacement.version = "2.0.0".to_string();
        replacement.component = "other";
        assert!(registry.register(replacement).is_ok());

        assert_eq!(registry.len(), 1);
        let kept = registry.get_feature("dup").unwrap();
        assert_eq!(kept.version, "1.0.0");
        assert_eq!(kept.component, "component");
    }

    #[test]
    fn test_unresolved_dependency() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("present")).unwrap();
        let def = feature("dependent-feature").with_dependencies(["present", "non-existent", "also-missing"]);

        let err = registry.register(def).unwrap_err();
        assert_eq!(err, RegistryError::unresolved("dependent-feature", "non-existent"));
        assert!(err.to_string().contains("depends on unregistered feature: non-existent"));
        assert!(!registry.is_registered("dependent-feature"));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let mut registry = PluginRegistry::new();
        let err = registry.register(feature("loop").with_dependencies(["loop"])).unwrap_err();
        assert_eq!(err, RegistryError::unresolved("loop", "loop"));
    }

    #[test]
    fn test_unregister_blocked_by_dependents() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("base")).unwrap();
        registry.register(feature("dependent").with_dependencies(["base"])).unwrap();
        registry.register(feature("other")).unwrap();
        registry.register(feature("second").with_dependencies(["other", "base"])).unwrap();

        let err = registry.unregister("base").unwrap_err();
        assert_eq!(
            err,
            RegistryError::dependents_exist("base", vec!["dependent".to_string(), "second".to_string()])
        );
        assert_eq!(err.to_string(), "Cannot unregister feature base, it has dependents: dependent, second");
        assert!(registry.is_registered("base"));
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let mut registry: PluginRegistry<&str> = PluginRegistry::new();
        assert!(registry.unregister("non-existent").is_ok());
        assert!(registry.get_feature("non-existent").is_none());
    }

    #[test]
    fn test_unregister_preserves_order_of_rest() {
        let mut registry = PluginRegistry::new();
        for id in ["a", "b", "c"] {
            registry.register(feature(id)).unwrap();
        }
        registry.unregister("b").unwrap();
        registry.register(feature("b")).unwrap();
        assert_eq!(ids(&registry.get_all_features()), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_clear() {
        let mut registry = PluginRegistry::with_config(RegistryConfig::new(featurekit_core::Environment::Test));
        registry.register(feature("base")).unwrap();
        registry.register(feature("dependent").with_dependencies(["base"])).unwrap();
        registry.clear();

        assert!(registry.get_all_features().is_empty());
        assert!(!registry.is_registered("base"));
        assert!(!registry.is_registered("dependent"));
    }

    #[test]
    fn test_enabled_features() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("on")).unwrap();
        registry.register(feature("off").with_enabled(false)).unwrap();
        assert_eq!(ids(&registry.get_enabled_features()), vec!["on"]);
    }

    #[test]
    fn test_enable_requires_enabled_dependencies() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("base").with_enabled(false)).unwrap();
        registry
            .register(feature("top").with_dependencies(["base"]).with_enabled(false))
            .unwrap();

        let err = registry.enable_feature("top").unwrap_err();
        assert_eq!(err, RegistryError::dependency_disabled("top", "base"));

        registry.enable_feature("base").unwrap();
        registry.enable_feature("top").unwrap();
        assert!(registry.get_feature("top").unwrap().enabled);
    }

    #[test]
    fn test_enable_disable_unknown() {
        let mut registry: PluginRegistry<()> = PluginRegistry::new();
        assert_eq!(registry.enable_feature("ghost"), Err(RegistryError::not_found("ghost")));
        assert_eq!(registry.disable_feature("ghost"), Err(RegistryError::not_found("ghost")));
    }

    #[test]
    fn test_disable_cascades_to_dependents() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("base")).unwrap();
        registry.register(feature("mid").with_dependencies(["base"])).unwrap();
        registry.register(feature("leaf").with_dependencies(["mid"])).unwrap();
        registry.register(feature("unrelated")).unwrap();

        registry.disable_feature("base").unwrap();
        assert_eq!(ids(&registry.get_enabled_features()), vec!["unrelated"]);
    }

    #[test]
    fn test_disable_layered_diamond_visits_each_feature_once() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("root")).unwrap();
        let mut previous = vec!["root".to_string()];
        for layer in 0..40 {
            let current = vec![format!("l{}a", layer), format!("l{}b", layer)];
            for id in &current {
                registry
                    .register(feature(id).with_dependencies(previous.clone()))
                    .unwrap();
            }
            previous = current;
        }
        registry.register(feature("standalone")).unwrap();
        assert_eq!(registry.len(), 82);

        registry.disable_feature("root").unwrap();
        assert_eq!(ids(&registry.get_enabled_features()), vec!["standalone"]);

        registry.enable_feature("root").unwrap();
        registry.enable_feature("l0a").unwrap();
        registry.disable_feature("l0a").unwrap();
        assert_eq!(ids(&registry.get_enabled_features()), vec!["root", "standalone"]);
    }

    #[test]
    fn test_register_accepts_whitespace_fields() {
        let mut registry = PluginRegistry::new();
        registry
            .register(FeatureDefinition::new("x", " ", "1.0.0", "d", ()))
            .unwrap();
        assert_eq!(registry.get_feature("x").unwrap().name, " ");
    }

    #[test]
    fn test_report_fault() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("base")).unwrap();
        registry.register(feature("overlay").with_dependencies(["base"])).unwrap();

        let soft = FeatureFault::recoverable("base", FaultPhase::Render, "retrying");
        assert!(!registry.report_fault(&soft));
        assert!(registry.get_feature("base").unwrap().enabled);

        let hard = FeatureFault::critical("base", FaultPhase::Mount, "asset missing");
        assert!(registry.report_fault(&hard));
        assert!(!registry.get_feature("base").unwrap().enabled);
        // No cascade
        assert!(registry.get_feature("overlay").unwrap().enabled);

        let unknown = FeatureFault::critical("ghost", FaultPhase::Mount, "gone");
        assert!(!registry.report_fault(&unknown));
    }

    #[test]
    fn test_state_snapshot() {
        let mut registry = PluginRegistry::new();
        registry.register(feature("base")).unwrap();
        registry
            .register(feature("dependent").with_dependencies(["base"]).with_enabled(false))
            .unwrap();

        let state = registry.state();
        assert_eq!(state.total_features, 2);
        assert_eq!(state.enabled_features, 1);
        assert_eq!(state.features[1].dependencies, vec!["base".to_string()]);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["features"][0]["id"], "base");
        assert!(json["features"][0].get("component").is_none());
    }

    #[test]
    fn test_with_feature_builder() {
        let registry = PluginRegistry::new()
            .with_feature(feature("base"))
            .and_then(|r| r.with_feature(feature("dependent").with_dependencies(["base"])))
            .unwrap();
        assert_eq!(registry.dependents_of("base"), vec!["dependent".to_string()]);
    }
}
