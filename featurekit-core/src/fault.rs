//! Faults raised by running features

use serde::{Deserialize, Serialize};

/// Lifecycle phase in which a fault happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPhase {
    Mount,
    Unmount,
    Enable,
    Disable,
    Render,
}

impl std::fmt::Display for FaultPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FaultPhase::Mount => "mount",
            FaultPhase::Unmount => "unmount",
            FaultPhase::Enable => "enable",
            FaultPhase::Disable => "disable",
            FaultPhase::Render => "render",
        };
        f.write_str(s)
    }
}

/// Error reported by (or on behalf of) a feature at runtime.
///
/// A non-recoverable fault switches the feature off in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFault {
    pub feature_id: String,
    pub phase: FaultPhase,
    pub message: String,
    pub recoverable: bool,
}

impl FeatureFault {
    pub fn recoverable(feature_id: impl Into<String>, phase: FaultPhase, message: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            phase,
            message: message.into(),
            recoverable: true,
        }
    }

    pub fn critical(feature_id: impl Into<String>, phase: FaultPhase, message: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            phase,
            message: message.into(),
            recoverable: false,
        }
    }
}

impl std::fmt::Display for FeatureFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.feature_id, self.phase, self.message)?;
        if !self.recoverable {
            write!(f, " (critical)")?;
        }
        Ok(())
    }
}

impl std::error::Error for FeatureFault {}
