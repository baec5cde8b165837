//! Core configuration types and traits
//!
//! This module contains the foundational declaration types:
//! - `SettingSchema` - Static declaration of one setting (name, type, default, validators)
//! - `SettingsSchema` - Trait for declaring a table of settings and cross-setting rules
//! - `RegistryConfig` - Configuration for building the registry

mod schema;
mod types;

pub use schema::{SettingSchema, SettingType, SettingsSchema};

pub use types::{DefaultEnvSource, EnvSource, RegistryConfig, RegistryConfigBuilder};
