//! Builder for SettingsRegistry
//!
//! This module contains [`SettingsRegistryBuilder`] which provides a fluent API
//! for creating a [`SettingsRegistry`](super::SettingsRegistry).

use crate::config::{EnvSource, RegistryConfigBuilder, SettingSchema, SettingsSchema};
use crate::error::Result;
use crate::validation::CrossRule;
use std::sync::Arc;

use super::SettingsRegistry;

/// Builder for creating a [`SettingsRegistry`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use axiom_settings::{CrossRule, SettingSchema, SettingsRegistry};
///
/// let registry = SettingsRegistry::builder()
///     .with_setting(SettingSchema::bool("LOG_GCP_ENABLED", false))
///     .with_setting(SettingSchema::string("LOG_GCP_PROJECT", ""))
///     .with_rule(CrossRule::requires_when("LOG_GCP_ENABLED", "LOG_GCP_PROJECT"))
///     .with_env_prefix("MYAPP")
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct SettingsRegistryBuilder {
    config_builder: RegistryConfigBuilder,
}

impl SettingsRegistryBuilder {
    /// Create a new builder with no settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare every setting and rule of a schema table.
    ///
    /// Several tables can be combined; names must stay unique across them.
    #[must_use]
    pub fn with_schema<T: SettingsSchema>(mut self) -> Self {
        self.config_builder = self.config_builder.with_schema::<T>();
        self
    }

    /// Declare a single setting.
    #[must_use]
    pub fn with_setting(mut self, setting: SettingSchema) -> Self {
        self.config_builder = self.config_builder.with_setting(setting);
        self
    }

    /// Add a cross-setting rule, checked after every change.
    #[must_use]
    pub fn with_rule(mut self, rule: CrossRule) -> Self {
        self.config_builder = self.config_builder.with_rule(rule);
        self
    }

    /// Look environment variables up as `{PREFIX}_{NAME}`.
    ///
    /// Without a prefix each setting is looked up under its exact name.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.with_env_prefix(prefix);
        self
    }

    /// Use a custom environment source (tests, sandboxes).
    #[must_use]
    pub fn with_env_source(mut self, source: Arc<dyn EnvSource>) -> Self {
        self.config_builder = self.config_builder.with_env_source(source);
        self
    }

    /// Do not apply the environment overlay at construction.
    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.config_builder = self.config_builder.without_env();
        self
    }

    /// Build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`](crate::Error::InvalidSchema) for
    /// duplicate names or defaults that fail their own validation.
    pub fn build(self) -> Result<SettingsRegistry> {
        SettingsRegistry::new(self.config_builder.build())
    }

    /// Build the process-wide registry, or return the existing one.
    ///
    /// See [`SettingsRegistry::init_shared`].
    ///
    /// # Errors
    ///
    /// Returns construction errors when this call creates the registry.
    pub fn build_shared(self) -> Result<&'static SettingsRegistry> {
        SettingsRegistry::init_shared(self.config_builder.build())
    }
}
