//! Registry configuration and environment sources

use std::fmt;
use std::sync::Arc;

use crate::config::{SettingSchema, SettingsSchema};
use crate::validation::CrossRule;

// =============================================================================
// Environment Sources
// =============================================================================

/// Source of environment variables
///
/// The registry reads the process environment through this trait so tests
/// and embedders can supply their own variables.
pub trait EnvSource: Send + Sync {
    /// Look up a variable, returning `None` when it is unset or not unicode
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

// =============================================================================
// Registry Configuration
// =============================================================================

/// Configuration for building a [`SettingsRegistry`](crate::SettingsRegistry)
pub struct RegistryConfig {
    /// Declared settings, in declaration order
    pub settings: Vec<SettingSchema>,

    /// Cross-setting rules
    pub rules: Vec<CrossRule>,

    /// Environment variable prefix (e.g., "MYAPP" -> `MYAPP_RETRY_LIMIT`).
    /// If None, variables are matched by the exact setting name.
    pub env_prefix: Option<String>,

    /// Where environment variables are read from
    pub env_source: Arc<dyn EnvSource>,

    /// Apply the environment overlay during initialization
    pub load_env: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            settings: Vec::new(),
            rules: Vec::new(),
            env_prefix: None,
            env_source: Arc::new(DefaultEnvSource),
            load_env: true,
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("settings", &self.settings)
            .field("rules", &self.rules)
            .field("env_prefix", &self.env_prefix)
            .field("load_env", &self.load_env)
            .finish_non_exhaustive()
    }
}

impl RegistryConfig {
    /// Create a new builder for `RegistryConfig`
    ///
    /// # Example
    /// ```rust
    /// use axiom_settings::{RegistryConfig, SettingSchema};
    ///
    /// let config = RegistryConfig::builder()
    ///     .with_setting(SettingSchema::int("RETRY_LIMIT", 3))
    ///     .with_env_prefix("MYAPP")
    ///     .build();
    ///
    /// assert_eq!(config.settings.len(), 1);
    /// ```
    #[must_use]
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::new()
    }
}

/// Builder for creating `RegistryConfig` with a fluent API
#[derive(Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl fmt::Debug for RegistryConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegistryConfigBuilder")
            .field(&self.config)
            .finish()
    }
}

impl RegistryConfigBuilder {
    /// Create a builder with no settings and the process environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every setting and rule of a schema table
    ///
    /// May be called several times; tables are concatenated in call order.
    #[must_use]
    pub fn with_schema<T: SettingsSchema>(mut self) -> Self {
        self.config.settings.extend(T::settings());
        self.config.rules.extend(T::rules());
        self
    }

    /// Declare a single setting
    #[must_use]
    pub fn with_setting(mut self, setting: SettingSchema) -> Self {
        self.config.settings.push(setting);
        self
    }

    /// Add a cross-setting rule
    #[must_use]
    pub fn with_rule(mut self, rule: CrossRule) -> Self {
        self.config.rules.push(rule);
        self
    }

    /// Enable a prefix for environment variable lookups
    ///
    /// The variable name becomes `{PREFIX}_{NAME}` with the prefix uppercased.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.env_prefix = Some(prefix.into());
        self
    }

    /// Read environment variables from a custom source
    #[must_use]
    pub fn with_env_source(mut self, source: Arc<dyn EnvSource>) -> Self {
        self.config.env_source = source;
        self
    }

    /// Skip the environment overlay during initialization
    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.config.load_env = false;
        self
    }

    /// Build the `RegistryConfig`
    #[must_use]
    pub fn build(self) -> RegistryConfig {
        self.config
    }
}
