//! Logging settings
//!
//! [`LoggingSettings`] declares the settings a logging facade reads, and
//! [`LogConfig`] is the typed snapshot it rebuilds its outputs from. A facade
//! typically does:
//!
//! ```rust
//! use axiom_settings::{LogConfig, LoggingSettings, SettingsRegistry};
//!
//! let registry = SettingsRegistry::builder()
//!     .with_schema::<LoggingSettings>()
//!     .without_env()
//!     .build()?;
//!
//! let config = LogConfig::from_registry(&registry)?;
//! assert!(config.console_enabled());
//!
//! registry.add_global_observer(|registry, name, _| {
//!     if name.starts_with("LOG_") {
//!         if let Ok(config) = LogConfig::from_registry(registry) {
//!             // rebuild outputs from `config`
//!             let _ = config;
//!         }
//!     }
//! });
//! # Ok::<(), axiom_settings::Error>(())
//! ```

use crate::config::{SettingSchema, SettingsSchema};
use crate::error::Result;
use crate::events::ObserverId;
use crate::registry::SettingsRegistry;
use crate::storage;
use crate::validation::{CrossRule, Validator};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Names of every logging setting, in declaration order
pub const LOGGING_SETTING_NAMES: [&str; 10] = [
    "LOG_TO_CONSOLE",
    "LOG_TO_FILE",
    "LOG_FILE_LOCATION",
    "LOG_GCP_ENABLED",
    "LOG_GCP_PROJECT",
    "LOG_BATCH_SIZE",
    "LOG_FORMAT",
    "LOG_STD_LEVEL",
    "LOG_FILE_LEVEL",
    "LOG_GCP_LEVEL",
];

const LEVELS: [&str; 6] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "OFF"];

/// Accepts level names case-insensitively and stores them uppercased.
///
/// `WARNING` and `CRITICAL` are accepted as aliases of `WARN` and `ERROR`.
fn level_validator() -> Validator {
    Validator::new("log_level", |_, value| {
        let raw = value.as_str().unwrap_or_default().trim().to_uppercase();
        let level = match raw.as_str() {
            "WARNING" => "WARN".to_string(),
            "CRITICAL" => "ERROR".to_string(),
            _ => raw,
        };
        if LEVELS.contains(&level.as_str()) {
            Ok(Value::String(level))
        } else {
            Err(format!("must be one of {}, got {value}", LEVELS.join(", ")))
        }
    })
}

/// Schema table of the logging settings
pub struct LoggingSettings;

impl SettingsSchema for LoggingSettings {
    fn settings() -> Vec<SettingSchema> {
        vec![
            SettingSchema::bool("LOG_TO_CONSOLE", true).description("Write logs to stdout"),
            SettingSchema::bool("LOG_TO_FILE", false).description("Write logs to a file"),
            SettingSchema::string("LOG_FILE_LOCATION", "")
                .description("Log file path; empty means logs/application.log under the working directory"),
            SettingSchema::bool("LOG_GCP_ENABLED", false)
                .description("Enable Google Cloud Platform logging"),
            SettingSchema::string("LOG_GCP_PROJECT", "")
                .description("GCP project receiving logs"),
            SettingSchema::int("LOG_BATCH_SIZE", 0)
                .range(0, 100_000)
                .description("How many records to buffer before sending; 0 disables batching"),
            SettingSchema::string("LOG_FORMAT", "[{level}] {target}: {message}")
                .non_empty()
                .description("Record format template"),
            SettingSchema::string("LOG_STD_LEVEL", "INFO")
                .validator(level_validator())
                .description("Minimum level written to stdout"),
            SettingSchema::string("LOG_FILE_LEVEL", "DEBUG")
                .validator(level_validator())
                .description("Minimum level written to the log file"),
            SettingSchema::string("LOG_GCP_LEVEL", "INFO")
                .validator(level_validator())
                .description("Minimum level sent to GCP"),
        ]
    }

    fn rules() -> Vec<CrossRule> {
        vec![CrossRule::requires_when("LOG_GCP_ENABLED", "LOG_GCP_PROJECT")]
    }
}

/// Typed snapshot of the logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub to_console: bool,
    pub to_file: bool,
    pub file_location: String,
    pub gcp_enabled: bool,
    pub gcp_project: String,
    pub batch_size: usize,
    pub format: String,
    pub std_level: String,
    pub file_level: String,
    pub gcp_level: String,
}

impl LogConfig {
    /// Read the current logging settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`](crate::Error::UnknownSetting) if the
    /// registry was built without [`LoggingSettings`].
    pub fn from_registry(registry: &SettingsRegistry) -> Result<Self> {
        Ok(Self {
            to_console: registry.get("LOG_TO_CONSOLE")?,
            to_file: registry.get("LOG_TO_FILE")?,
            file_location: registry.get("LOG_FILE_LOCATION")?,
            gcp_enabled: registry.get("LOG_GCP_ENABLED")?,
            gcp_project: registry.get("LOG_GCP_PROJECT")?,
            batch_size: registry.get("LOG_BATCH_SIZE")?,
            format: registry.get("LOG_FORMAT")?,
            std_level: registry.get("LOG_STD_LEVEL")?,
            file_level: registry.get("LOG_FILE_LEVEL")?,
            gcp_level: registry.get("LOG_GCP_LEVEL")?,
        })
    }

    /// Whether console output is active.
    ///
    /// Console output is the fallback when no output is enabled at all.
    #[must_use]
    pub fn console_enabled(&self) -> bool {
        self.to_console || (!self.to_file && !self.gcp_enabled)
    }

    /// Whether records should be buffered before being sent
    #[must_use]
    pub fn batching(&self) -> bool {
        self.batch_size > 0
    }

    /// `LOG_STD_LEVEL` as a [`LevelFilter`]
    #[must_use]
    pub fn std_level_filter(&self) -> LevelFilter {
        level_filter(&self.std_level)
    }

    /// `LOG_FILE_LEVEL` as a [`LevelFilter`]
    #[must_use]
    pub fn file_level_filter(&self) -> LevelFilter {
        level_filter(&self.file_level)
    }

    /// `LOG_GCP_LEVEL` as a [`LevelFilter`]
    #[must_use]
    pub fn gcp_level_filter(&self) -> LevelFilter {
        level_filter(&self.gcp_level)
    }

    /// Resolved log file path.
    ///
    /// An empty `LOG_FILE_LOCATION` resolves to `logs/application.log` under
    /// the current working directory; a leading `~` is expanded otherwise.
    /// The parent directory is not created.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        let location = self.file_location.trim();
        if location.is_empty() {
            return std::env::current_dir()
                .unwrap_or_default()
                .join(DEFAULT_LOG_DIR)
                .join(DEFAULT_LOG_FILE);
        }
        storage::expand_home(Path::new(location))
    }
}

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "application.log";

fn level_filter(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

/// Keep [`log::max_level`] in step with `LOG_STD_LEVEL`.
///
/// Applies the current level immediately, then registers an observer that
/// re-applies it on every change.
///
/// # Errors
///
/// Returns [`Error::UnknownSetting`](crate::Error::UnknownSetting) if the
/// registry was built without [`LoggingSettings`].
pub fn sync_max_level(registry: &SettingsRegistry) -> Result<ObserverId> {
    let current: String = registry.get("LOG_STD_LEVEL")?;
    log::set_max_level(level_filter(&current));
    registry.add_observer("LOG_STD_LEVEL", |_, _, value| {
        let filter = level_filter(value.as_str().unwrap_or_default());
        log::set_max_level(filter);
        log::debug!("Log level set to {filter}");
    })
}
