use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::Result;

/// Default upper bound for a revision request, in seconds.
pub const DEFAULT_MAX_REVISION_TIMEOUT_SECONDS: u64 = 600;

fn default_max_revision_timeout_seconds() -> u64 {
    DEFAULT_MAX_REVISION_TIMEOUT_SECONDS
}

#[derive(Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    #[builder(setter(into))]
    pub controller_name: String,
    #[serde(default)]
    #[builder(default)]
    pub enable_open_telemetry: Option<bool>,
    /// Timeout written on routes whose paths don't carry one.
    #[serde(default = "default_max_revision_timeout_seconds")]
    #[builder(default = DEFAULT_MAX_REVISION_TIMEOUT_SECONDS)]
    pub default_max_revision_timeout_seconds: u64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("controller name must be not empty")]
    ControllerName,
    #[error("default max revision timeout must be greater than zero")]
    MaxRevisionTimeout,
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if self.controller_name.is_empty() {
            return Err(ConfigurationError::ControllerName.into());
        }
        if self.default_max_revision_timeout_seconds == 0 {
            return Err(ConfigurationError::MaxRevisionTimeout.into());
        }
        Ok(())
    }

    pub fn default_max_revision_timeout(&self) -> Duration {
        Duration::from_secs(self.default_max_revision_timeout_seconds)
    }
}
