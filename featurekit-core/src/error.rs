//! Registry errors
//!
//! Every failure is synchronous and caller-fixable. Nothing here is retried:
//! the registry is in-memory and has no transient failure modes.

use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_DEFINITION: &str = "INVALID_DEFINITION";
    pub const UNRESOLVED_DEPENDENCY: &str = "UNRESOLVED_DEPENDENCY";
    pub const DEPENDENTS_EXIST: &str = "DEPENDENTS_EXIST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DEPENDENCY_DISABLED: &str = "DEPENDENCY_DISABLED";
}

/// Field of a feature definition that failed shape validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionField {
    Id,
    Name,
    Version,
    Description,
}

impl DefinitionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionField::Id => "id",
            DefinitionField::Name => "name",
            DefinitionField::Version => "version",
            DefinitionField::Description => "description",
        }
    }
}

impl std::fmt::Display for DefinitionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A required field is missing or blank
    #[error("Invalid feature definition: {id} ({field} must not be empty)")]
    InvalidDefinition { id: String, field: DefinitionField },

    /// A declared dependency is not registered yet
    #[error("Feature {feature} depends on unregistered feature: {dependency}")]
    UnresolvedDependency { feature: String, dependency: String },

    /// Other registered features still depend on this one
    #[error("Cannot unregister feature {feature}, it has dependents: {}", .dependents.join(", "))]
    DependentsExist { feature: String, dependents: Vec<String> },

    #[error("Feature not found: {id}")]
    NotFound { id: String },

    /// Enabling requires every dependency to be enabled first
    #[error("Cannot enable {feature}, dependency {dependency} is not enabled")]
    DependencyDisabled { feature: String, dependency: String },
}

impl RegistryError {
    pub fn invalid(id: impl Into<String>, field: DefinitionField) -> Self {
        Self::InvalidDefinition { id: id.into(), field }
    }

    pub fn unresolved(feature: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::UnresolvedDependency {
            feature: feature.into(),
            dependency: dependency.into(),
        }
    }

    pub fn dependents_exist(feature: impl Into<String>, dependents: Vec<String>) -> Self {
        Self::DependentsExist { feature: feature.into(), dependents }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn dependency_disabled(feature: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::DependencyDisabled {
            feature: feature.into(),
            dependency: dependency.into(),
        }
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::InvalidDefinition { .. } => codes::INVALID_DEFINITION,
            RegistryError::UnresolvedDependency { .. } => codes::UNRESOLVED_DEPENDENCY,
            RegistryError::DependentsExist { .. } => codes::DEPENDENTS_EXIST,
            RegistryError::NotFound { .. } => codes::NOT_FOUND,
            RegistryError::DependencyDisabled { .. } => codes::DEPENDENCY_DISABLED,
        }
    }

    /// Feature the failed operation was about
    pub fn feature_id(&self) -> &str {
        match self {
            RegistryError::InvalidDefinition { id, .. } => id,
            RegistryError::UnresolvedDependency { feature, .. } => feature,
            RegistryError::DependentsExist { feature, .. } => feature,
            RegistryError::NotFound { id } => id,
            RegistryError::DependencyDisabled { feature, .. } => feature,
        }
    }
}
