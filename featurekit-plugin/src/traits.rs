//! Registry traits

use crate::{FeatureSummary, RegistryState};
use featurekit_core::{FeatureDefinition, RegistryError};

/// Interface of a feature registry.
///
/// Bootstrap and rendering code depend on this trait rather than on a
/// concrete store, so a registry can be swapped or wrapped.
pub trait FeatureRegistry {
    /// Opaque component payload stored with each feature
    type Component;

    fn register(&mut self, feature: FeatureDefinition<Self::Component>) -> Result<(), RegistryError>;
    fn unregister(&mut self, id: &str) -> Result<(), RegistryError>;
    fn is_registered(&self, id: &str) -> bool;
    fn get_feature(&self, id: &str) -> Option<&FeatureDefinition<Self::Component>>;

    /// All features in registration order
    fn get_all_features(&self) -> Vec<&FeatureDefinition<Self::Component>>;

    fn get_enabled_features(&self) -> Vec<&FeatureDefinition<Self::Component>> {
        self.get_all_features()
            .into_iter()
            .filter(|f| f.enabled)
            .collect()
    }

    fn enable_feature(&mut self, id: &str) -> Result<(), RegistryError>;
    fn disable_feature(&mut self, id: &str) -> Result<(), RegistryError>;
    fn clear(&mut self);

    /// Serializable snapshot, without components or config
    fn state(&self) -> RegistryState {
        let features: Vec<FeatureSummary> = self
            .get_all_features()
            .into_iter()
            .map(FeatureSummary::from_definition)
            .collect();
        RegistryState {
            total_features: features.len(),
            enabled_features: features.iter().filter(|f| f.enabled).count(),
            features,
        }
    }
}
