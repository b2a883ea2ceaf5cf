//! Feature Manager
//!
//! Wraps a registry with per-plugin status tracking, change listeners and a
//! health report. Operations never propagate registry errors: they log them
//! and return `false`, which suits bootstrap code that must keep going.

use crate::FeatureRegistry;
use featurekit_core::FeatureDefinition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

/// Status of a single plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginStatus {
    pub id: String,
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManagerState {
    pub plugins: BTreeMap<String, PluginStatus>,
    pub total_plugins: usize,
    pub enabled_plugins: usize,
    pub last_update: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total_plugins: usize,
    pub enabled_plugins: usize,
    pub disabled_plugins: usize,
    pub errored_plugins: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub issues: Vec<String>,
    pub summary: HealthSummary,
    pub details: Vec<PluginStatus>,
}

/// Handle returned by [`FeatureManager::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ManagerState)>;

/// Status-tracking front end over a [`FeatureRegistry`]
pub struct FeatureManager<R: FeatureRegistry> {
    registry: R,
    state: ManagerState,
    registered_at: HashMap<String, u64>,
    /// Last registration failure per id
    errors: HashMap<String, FailedRegistration>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

#[derive(Debug, Clone)]
struct FailedRegistration {
    name: String,
    version: String,
    error: String,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl<R: FeatureRegistry> FeatureManager<R> {
    pub fn new(registry: R) -> Self {
        let mut manager = Self {
            registry,
            state: ManagerState::default(),
            registered_at: HashMap::new(),
            errors: HashMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
        };
        manager.refresh();
        manager
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Direct access to the registry. Call [`FeatureManager::refresh`]
    /// afterwards so statuses catch up.
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn into_registry(self) -> R {
        self.registry
    }

    pub fn state(&self) -> &ManagerState {
        &self.state
    }

    pub fn plugin_status(&self, id: &str) -> Option<&PluginStatus> {
        self.state.plugins.get(id)
    }

    pub fn all_plugin_statuses(&self) -> Vec<&PluginStatus> {
        self.state.plugins.values().collect()
    }

    /// Registered and enabled
    pub fn is_plugin_ready(&self, id: &str) -> bool {
        self.plugin_status(id).is_some_and(|s| s.registered && s.enabled)
    }

    pub fn register_plugin(&mut self, feature: FeatureDefinition<R::Component>) -> bool {
        let id = feature.id.clone();
        let name = feature.name.clone();
        let version = feature.version.clone();

        match self.registry.register(feature) {
            Ok(()) => {
                self.errors.remove(&id);
                self.registered_at.entry(id.clone()).or_insert_with(now_millis);
                self.refresh();
                tracing::debug!(plugin = %id, "registered plugin");
                true
            }
            Err(err) => {
                tracing::error!(plugin = %id, code = err.code(), "failed to register plugin: {}", err);
                self.errors.insert(id, FailedRegistration { name, version, error: err.to_string() });
                self.refresh();
                false
            }
        }
    }

    pub fn unregister_plugin(&mut self, id: &str) -> bool {
        match self.registry.unregister(id) {
            Ok(()) => {
                self.registered_at.remove(id);
                self.errors.remove(id);
                self.refresh();
                tracing::debug!(plugin = %id, "unregistered plugin");
                true
            }
            Err(err) => {
                tracing::error!(plugin = %id, code = err.code(), "failed to unregister plugin: {}", err);
                false
            }
        }
    }

    pub fn enable_plugin(&mut self, id: &str) -> bool {
        match self.registry.enable_feature(id) {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(err) => {
                tracing::error!(plugin = %id, code = err.code(), "failed to enable plugin: {}", err);
                false
            }
        }
    }

    pub fn disable_plugin(&mut self, id: &str) -> bool {
        match self.registry.disable_feature(id) {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(err) => {
                tracing::error!(plugin = %id, code = err.code(), "failed to disable plugin: {}", err);
                false
            }
        }
    }

    /// Rebuild statuses from the registry and notify listeners
    pub fn refresh(&mut self) {
        let mut plugins = BTreeMap::new();
        let mut enabled_plugins = 0;

        let features = self.registry.get_all_features();
        let total_plugins = features.len();
        for feature in features {
            if feature.enabled {
                enabled_plugins += 1;
            }
            plugins.insert(
                feature.id.clone(),
                PluginStatus {
                    id: feature.id.clone(),
                    name: feature.name.clone(),
                    version: feature.version.clone(),
                    enabled: feature.enabled,
                    registered: true,
                    last_error: self.errors.get(&feature.id).map(|f| f.error.clone()),
                    registration_time: self.registered_at.get(&feature.id).copied(),
                },
            );
        }

        // Ids removed behind our back (registry_mut, clear) lose their timestamp
        self.registered_at.retain(|id, _| plugins.contains_key(id));

        for (id, failed) in &self.errors {
            plugins.entry(id.clone()).or_insert_with(|| PluginStatus {
                id: id.clone(),
                name: failed.name.clone(),
                version: failed.version.clone(),
                enabled: false,
                registered: false,
                last_error: Some(failed.error.clone()),
                registration_time: None,
            });
        }

        self.state = ManagerState {
            plugins,
            total_plugins,
            enabled_plugins,
            last_update: now_millis(),
        };
        self.notify();
    }

    /// Register a listener. It is called right away with the current state.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&ManagerState) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        listener(&self.state);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, listener) in self.listeners.iter_mut() {
            listener(state);
        }
    }

    pub fn health_report(&self) -> HealthReport {
        let details: Vec<PluginStatus> = self.state.plugins.values().cloned().collect();
        let errored = details.iter().filter(|s| s.last_error.is_some()).count();
        let disabled = details.iter().filter(|s| s.registered && !s.enabled).count();

        let mut issues = Vec::new();
        if errored > 0 {
            issues.push(format!("{} plugin(s) have errors", errored));
        }
        if disabled > 0 {
            issues.push(format!("{} plugin(s) are disabled", disabled));
        }

        HealthReport {
            healthy: issues.is_empty(),
            issues,
            summary: HealthSummary {
                total_plugins: self.state.total_plugins,
                enabled_plugins: self.state.enabled_plugins,
                disabled_plugins: disabled,
                errored_plugins: errored,
            },
            details,
        }
    }

    /// Write the health report to the log
    pub fn log_status(&self) {
        let report = self.health_report();
        for status in &report.details {
            tracing::info!(
                plugin = %status.id,
                version = %status.version,
                enabled = status.enabled,
                registered = status.registered,
                "plugin status"
            );
        }
        tracing::info!(
            total = report.summary.total_plugins,
            enabled = report.summary.enabled_plugins,
            disabled = report.summary.disabled_plugins,
            errored = report.summary.errored_plugins,
            "health report"
        );
        if !report.healthy {
            tracing::warn!(issues = ?report.issues, "plugin issues detected");
        }
    }
}
