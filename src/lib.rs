//! # axiom-settings - Typed Configuration Registry
//!
//! A process-wide registry of named, typed settings with layered sources,
//! validation and change notification.
//!
//! ## Features
//!
//! - **Typed Settings**: bool, int, string, object and list settings, each with a
//!   default and an optional validator chain
//! - **Layered Sources**: defaults, then environment variables, then file overlays
//!   (JSON and YAML; TOML behind the `toml` feature), then programmatic updates
//! - **Validation**: per-setting validators reject bad values before they are
//!   stored; cross-setting rules are checked after every change and reported
//! - **Observers**: per-setting and global callbacks run after each effective change
//! - **Thread Safety**: one registry can be shared across threads; mutations are
//!   serialized and never expose half-applied batches
//!
//! ## Quick Start
//!
//! ```rust
//! use axiom_settings::{CrossRule, SettingSchema, SettingsRegistry};
//! use serde_json::json;
//!
//! let registry = SettingsRegistry::builder()
//!     .with_setting(SettingSchema::int("RETRY_LIMIT", 3).range(0, 10))
//!     .with_setting(SettingSchema::list("FEATURE_FLAGS", &[]))
//!     .with_setting(SettingSchema::bool("LOG_GCP_ENABLED", false))
//!     .with_setting(SettingSchema::string("LOG_GCP_PROJECT", ""))
//!     .with_rule(CrossRule::requires_when("LOG_GCP_ENABLED", "LOG_GCP_PROJECT"))
//!     .without_env()
//!     .build()?;
//!
//! // Strings are parsed according to the declared type
//! registry.update_one("RETRY_LIMIT", "5")?;
//! registry.update_one("FEATURE_FLAGS", "beta, dark-mode")?;
//!
//! let retries: i64 = registry.get("RETRY_LIMIT")?;
//! assert_eq!(retries, 5);
//! assert_eq!(registry.query("FEATURE_FLAGS")?, json!(["beta", "dark-mode"]));
//! # Ok::<(), axiom_settings::Error>(())
//! ```
//!
//! ## Declaring a Schema Table
//!
//! ```rust
//! use axiom_settings::{CrossRule, SettingSchema, SettingsRegistry, SettingsSchema};
//!
//! struct ServiceSettings;
//!
//! impl SettingsSchema for ServiceSettings {
//!     fn settings() -> Vec<SettingSchema> {
//!         vec![
//!             SettingSchema::string("MODE", "standard")
//!                 .one_of(["standard", "strict"])
//!                 .description("Processing mode"),
//!             SettingSchema::bool("UPLOAD_ENABLED", false),
//!             SettingSchema::string("UPLOAD_BUCKET", ""),
//!         ]
//!     }
//!
//!     fn rules() -> Vec<CrossRule> {
//!         vec![CrossRule::requires_when("UPLOAD_ENABLED", "UPLOAD_BUCKET")]
//!     }
//! }
//!
//! let registry = SettingsRegistry::builder()
//!     .with_schema::<ServiceSettings>()
//!     .with_env_prefix("MYAPP") // reads MYAPP_MODE, MYAPP_UPLOAD_ENABLED, ...
//!     .build()?;
//! # Ok::<(), axiom_settings::Error>(())
//! ```
//!
//! ## Default Value Behavior
//!
//! Storing a value equal to the default clears the override, so
//! [`SettingsRegistry::export_all`] and [`SettingsRegistry::is_overridden`]
//! report only genuine customizations. Storing the current value again is a
//! no-op and does not notify observers.
//!
//! ## Observers
//!
//! Observers run synchronously on the mutating thread, after the registry's
//! locks are released. They may query the registry but must not mutate it:
//! doing so returns [`Error::ReentrantUpdate`].
//!
//! ```rust
//! use axiom_settings::{SettingSchema, SettingsRegistry};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let registry = SettingsRegistry::builder()
//!     .with_setting(SettingSchema::bool("LOG_GCP_ENABLED", false))
//!     .without_env()
//!     .build()?;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! registry.add_observer("LOG_GCP_ENABLED", move |_, _, _| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! })?;
//!
//! registry.update_one("LOG_GCP_ENABLED", true)?;
//! registry.update_one("LOG_GCP_ENABLED", true)?; // unchanged, not notified
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! # Ok::<(), axiom_settings::Error>(())
//! ```

pub mod config;
mod docs;
mod error;
mod events;
pub mod logging;
pub mod parse;
mod registry;
mod setting;
pub mod storage;
mod sync;
pub mod validation;

pub use config::{
    DefaultEnvSource, EnvSource, RegistryConfig, RegistryConfigBuilder, SettingSchema,
    SettingType, SettingsSchema,
};
pub use docs::{DocsConfig, generate_docs};
pub use error::{Error, Result};
pub use events::{Observer, ObserverId, ObserverList};
pub use logging::{LOGGING_SETTING_NAMES, LogConfig, LoggingSettings, sync_max_level};
pub use registry::{SettingInfo, SettingsRegistry, SettingsRegistryBuilder};
pub use setting::Setting;
pub use storage::OverlayFormat;
pub use validation::{CrossRule, Validator};
