//! Environment variable overlay
//!
//! Every declared setting is looked up under its own name (or
//! `{PREFIX}_{NAME}` when a prefix is configured). Values are raw text; the
//! setting's declared type decides how they are parsed.

use super::{SettingsRegistry, Staging};
use crate::config::EnvSource;
use crate::error::Result;
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;

/// Handles environment variable naming and lookups
pub(crate) struct EnvironmentHandler {
    prefix: Option<String>,
    source: Arc<dyn EnvSource>,
}

impl EnvironmentHandler {
    pub fn new(prefix: Option<String>, source: Arc<dyn EnvSource>) -> Self {
        Self { prefix, source }
    }

    /// Environment variable name for a setting
    pub fn var_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{name}", prefix.to_uppercase()),
            None => name.to_string(),
        }
    }

    /// Raw value of the variable for a setting, if set
    pub fn lookup(&self, name: &str) -> Option<String> {
        let var = self.var_name(name);
        let value = self.source.var(&var)?;
        debug!("Found environment variable {var} for {name}");
        Some(value)
    }
}

impl SettingsRegistry {
    /// Collect raw environment values for every declared setting
    pub(crate) fn environment_entries(&self) -> Vec<(String, Value)> {
        let names = self.list_names();
        names
            .into_iter()
            .filter_map(|name| {
                let raw = self.env_handler.lookup(&name)?;
                Some((name, Value::String(raw)))
            })
            .collect()
    }

    /// Environment variable name consulted for a setting
    #[must_use]
    pub fn env_var_name(&self, name: &str) -> String {
        self.env_handler.var_name(name)
    }

    /// Re-apply the environment overlay.
    ///
    /// Each present variable is parsed according to its setting's declared
    /// type and applied like [`update_one`](Self::update_one). A variable that
    /// fails to parse or validate is logged and skipped; the rest still apply.
    /// Observers are notified of every change.
    ///
    /// Returns the number of settings that changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReentrantUpdate`](crate::Error::ReentrantUpdate) when
    /// called from inside an observer.
    pub fn apply_environment_overlay(&self) -> Result<usize> {
        let entries = self.environment_entries();
        let applied = self.commit(entries, Staging::SkipRejected)?;
        if applied > 0 {
            info!("Applied {applied} setting(s) from the environment");
        }
        Ok(applied)
    }
}
