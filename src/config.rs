//! Workflow configuration loaded from TOML.

use serde::Deserialize;
use thiserror::Error;

use crate::scheduler::{SchedulerConfig, SchedulerConfigError};
use crate::task::services::LifecycleConfig;

/// Top-level settings for the lifecycle service and the deadline scheduler.
///
/// Every field is optional; missing sections take their defaults.
///
/// ```toml
/// [lifecycle]
/// enforce_dependencies = true
///
/// [scheduler]
/// overdue_scan = { every_secs = 1800 }
/// reminder_scan = { daily_at = "07:30:00" }
/// deduplicate_reminders = true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Lifecycle policy.
    pub lifecycle: LifecycleConfig,
    /// Scheduler cadences and scan settings.
    pub scheduler: SchedulerConfig,
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid workflow configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but lies outside its accepted range.
    #[error("invalid workflow configuration: {0}")]
    Range(#[from] SchedulerConfigError),
}

impl WorkflowConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents, unknown keys
    /// or badly formed schedules, and [`ConfigError::Range`] when a period
    /// or day count exceeds its limit.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.scheduler.validate()?;
        Ok(config)
    }
}
