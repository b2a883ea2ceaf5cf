//! Feature definitions
//!
//! A definition carries descriptive metadata, an opaque component handle and
//! an opaque config map. The registry stores both payloads and never looks
//! inside them.

use crate::{DefinitionField, RegistryError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Opaque per-feature configuration
pub type FeatureConfig = Map<String, JsonValue>;

/// A named, versioned unit of optional functionality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefinition<C> {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub component: C,
    #[serde(default)]
    pub config: FeatureConfig,
    pub enabled: bool,
    /// IDs that must be registered before this feature
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl<C> FeatureDefinition<C> {
    /// Create an enabled definition with no config and no dependencies
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        component: C,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: description.into(),
            component,
            config: FeatureConfig::new(),
            enabled: true,
            dependencies: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: FeatureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }

    /// Check that every required field is non-empty.
    pub fn validate_shape(&self) -> Result<(), RegistryError> {
        let required = [
            (DefinitionField::Id, &self.id),
            (DefinitionField::Name, &self.name),
            (DefinitionField::Version, &self.version),
            (DefinitionField::Description, &self.description),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(RegistryError::invalid(self.id.clone(), field));
            }
        }
        Ok(())
    }

    /// Swap the component, keeping everything else
    pub fn map_component<D>(self, f: impl FnOnce(C) -> D) -> FeatureDefinition<D> {
        FeatureDefinition {
            id: self.id,
            name: self.name,
            version: self.version,
            description: self.description,
            component: f(self.component),
            config: self.config,
            enabled: self.enabled,
            dependencies: self.dependencies,
        }
    }
}

/// Serializable description of a feature, without its component.
///
/// Bootstrap code loads these from configuration and attaches the component
/// it owns with [`FeatureManifest::into_definition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureManifest {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: FeatureConfig,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

impl FeatureManifest {
    pub fn into_definition<C>(self, component: C) -> FeatureDefinition<C> {
        FeatureDefinition {
            id: self.id,
            name: self.name,
            version: self.version,
            description: self.description,
            component,
            config: self.config,
            enabled: self.enabled,
            dependencies: self.dependencies,
        }
    }
}
