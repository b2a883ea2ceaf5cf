//! Featurekit Core - Fundamental types
//!
//! This crate provides the core types used throughout Featurekit:
//! - `FeatureDefinition`: A feature with opaque component and config payloads
//! - `RegistryError`: Structured, caller-fixable registry failures
//! - `FeatureFault`: Runtime faults reported by features
//! - `RegistryConfig`: Environment-driven runtime configuration

mod feature;
mod error;
mod fault;
mod config;

pub use feature::{FeatureDefinition, FeatureManifest, FeatureConfig};
pub use error::{RegistryError, DefinitionField, codes};
pub use fault::{FeatureFault, FaultPhase};
pub use config::{RegistryConfig, Environment, ENV_VAR};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{FeatureDefinition, FeatureManifest, FeatureConfig, RegistryError, FeatureFault, FaultPhase};
    pub use crate::error::codes;
}
