//! Featurekit Plugin System
//!
//! Provides the feature registry and its front ends:
//! - `FeatureRegistry`: registry interface
//! - `PluginRegistry`: in-memory store with dependency validation
//! - `FeatureContext`: read-only view handed to a running feature
//! - `FeatureManager`: status tracking, listeners and health reports

mod traits;
mod registry;
mod context;
mod manager;

pub use traits::FeatureRegistry;
pub use registry::{PluginRegistry, RegistryState, FeatureSummary};
pub use context::FeatureContext;
pub use manager::{FeatureManager, PluginStatus, ManagerState, HealthReport, HealthSummary, ListenerId};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        FeatureRegistry, PluginRegistry, RegistryState, FeatureSummary,
        FeatureContext, FeatureManager, PluginStatus, HealthReport,
    };
    pub use featurekit_core::prelude::*;
}
