//! Runtime configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable selecting the runtime environment
pub const ENV_VAR: &str = "FEATUREKIT_ENV";

/// Runtime environment the registry runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    #[default]
    Production,
}

impl Environment {
    /// Parse an environment name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "test" => Some(Environment::Test),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    /// Read from `FEATUREKIT_ENV`, falling back to production
    pub fn from_env() -> Self {
        env::var(ENV_VAR)
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Environment::Test)
    }
}

/// Registry configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub environment: Environment,
}

impl RegistryConfig {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn from_env() -> Self {
        Self::new(Environment::from_env())
    }
}
