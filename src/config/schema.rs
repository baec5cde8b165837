//! Setting declarations and the schema trait
//!
//! # Overview
//!
//! A [`SettingSchema`] is the static declaration of one setting: its name, its
//! declared [`SettingType`], a default of that type, a description and an
//! ordered chain of [`Validator`]s. Declarations are grouped into tables by
//! implementing [`SettingsSchema`].
//!
//! ```rust
//! use axiom_settings::{SettingSchema, SettingsSchema, CrossRule};
//!
//! struct ClientSettings;
//!
//! impl SettingsSchema for ClientSettings {
//!     fn settings() -> Vec<SettingSchema> {
//!         vec![
//!             SettingSchema::int("RETRY_LIMIT", 3)
//!                 .description("How many times a request is retried")
//!                 .range(0, 10),
//!             SettingSchema::list("FEATURE_FLAGS", &[])
//!                 .description("Enabled feature flags"),
//!             SettingSchema::bool("UPLOAD_ENABLED", false),
//!             SettingSchema::string("UPLOAD_BUCKET", ""),
//!         ]
//!     }
//!
//!     fn rules() -> Vec<CrossRule> {
//!         vec![CrossRule::requires_when("UPLOAD_ENABLED", "UPLOAD_BUCKET")]
//!     }
//! }
//! ```
//!
//! # Type coercion
//!
//! Values that reach a setting through an overlay are checked against the
//! declared type before any validator runs. A string offered for a non-string
//! setting goes through the matching parser in [`crate::parse`], so
//! `RETRY_LIMIT: "7"` in a YAML file is accepted as `7`.

use crate::error::{Error, Result};
use crate::parse::{json_kind, parse_value};
use crate::validation::{CrossRule, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

// =============================================================================
// Setting Types
// =============================================================================

/// Declared type of a setting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// Boolean flag
    Bool,
    /// Signed 64-bit integer
    Int,
    /// Free text, passed through unchanged
    String,
    /// JSON object
    Object,
    /// Ordered list of strings
    List,
}

impl SettingType {
    /// Check whether a JSON value already has this type
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            SettingType::Bool => value.is_boolean(),
            SettingType::Int => value.is_i64(),
            SettingType::String => value.is_string(),
            SettingType::Object => value.is_object(),
            SettingType::List => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    /// Bring an untyped value to this type.
    ///
    /// Values of the right type pass through; strings are parsed; anything
    /// else is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when a string does not parse, or
    /// [`Error::Validation`] on any other type mismatch.
    pub fn coerce(self, key: &str, value: Value) -> Result<Value> {
        if self.matches(&value) {
            return Ok(value);
        }
        match value {
            Value::String(raw) => parse_value(key, self, &raw),
            other => Err(Error::validation(
                key,
                format!("expected {self}, got {}", json_kind(&other)),
            )),
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingType::Bool => "bool",
            SettingType::Int => "int",
            SettingType::String => "string",
            SettingType::Object => "object",
            SettingType::List => "list",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Setting Schema
// =============================================================================

/// Static declaration of a single setting
///
/// # Example
///
/// ```
/// use axiom_settings::{SettingSchema, SettingType};
///
/// let level = SettingSchema::string("LOG_STD_LEVEL", "INFO")
///     .description("Console log level")
///     .one_of(["DEBUG", "INFO", "WARN", "ERROR"]);
///
/// assert_eq!(level.setting_type, SettingType::String);
/// assert!(level.validate_schema().is_ok());
/// ```
#[derive(Clone, Serialize)]
pub struct SettingSchema {
    /// Unique setting name (also the environment variable name)
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub setting_type: SettingType,

    /// Default value, of the declared type
    pub default: Value,

    /// Human readable description
    pub description: String,

    /// Per-setting validators, run in declaration order
    #[serde(skip)]
    pub validators: Vec<Validator>,
}

impl fmt::Debug for SettingSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingSchema")
            .field("name", &self.name)
            .field("setting_type", &self.setting_type)
            .field("default", &self.default)
            .field("description", &self.description)
            .field(
                "validators",
                &self.validators.iter().map(Validator::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SettingSchema {
    // =========================================================================
    // Type-specific constructors
    // =========================================================================

    fn with_default(name: impl Into<String>, setting_type: SettingType, default: Value) -> Self {
        Self {
            name: name.into(),
            setting_type,
            default,
            description: String::new(),
            validators: Vec::new(),
        }
    }

    /// Declare a boolean setting
    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::with_default(name, SettingType::Bool, Value::Bool(default))
    }

    /// Declare an integer setting
    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::with_default(name, SettingType::Int, json!(default))
    }

    /// Declare a string setting
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::with_default(name, SettingType::String, Value::String(default.into()))
    }

    /// Declare a structured (JSON object) setting
    ///
    /// A non-object default is caught by [`validate_schema`](Self::validate_schema).
    pub fn object(name: impl Into<String>, default: Value) -> Self {
        Self::with_default(name, SettingType::Object, default)
    }

    /// Declare a list-of-strings setting
    pub fn list(name: impl Into<String>, default: &[&str]) -> Self {
        Self::with_default(name, SettingType::List, json!(default))
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a validator to the chain
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Only accept one of the given values
    #[must_use]
    pub fn one_of<I, V>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.validator(Validator::one_of(allowed))
    }

    /// Only accept integers within `min..=max`
    #[must_use]
    pub fn range(self, min: i64, max: i64) -> Self {
        self.validator(Validator::range(min, max))
    }

    /// Only accept strings matching a regex
    #[must_use]
    pub fn pattern(self, pattern: &str) -> Self {
        self.validator(Validator::pattern(pattern))
    }

    /// Reject empty strings, lists and objects
    #[must_use]
    pub fn non_empty(self) -> Self {
        self.validator(Validator::non_empty())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Run a candidate through the type check and the validator chain.
    ///
    /// Returns the accepted (possibly normalized) value. The first failing
    /// validator aborts the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] or [`Error::Validation`] on rejection.
    pub fn validate(&self, candidate: Value) -> Result<Value> {
        let mut accepted = self.setting_type.coerce(&self.name, candidate)?;
        for validator in &self.validators {
            accepted = validator.check(&self.name, accepted)?;
        }
        Ok(accepted)
    }

    /// Validate the declaration itself.
    ///
    /// Checks that the name is usable and that the default has the declared
    /// type and passes every validator.
    ///
    /// # Errors
    ///
    /// Returns a reason string describing the problem.
    pub fn validate_schema(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("setting name cannot be empty".to_string());
        }
        if !self.setting_type.matches(&self.default) {
            return Err(format!(
                "default must be {}, got {}",
                self.setting_type,
                json_kind(&self.default)
            ));
        }
        self.validate(self.default.clone())
            .map_err(|e| format!("default value is invalid: {e}"))?;
        Ok(())
    }
}

// =============================================================================
// Settings Schema Trait
// =============================================================================

/// Trait for types that declare a table of settings
///
/// Implement this for a marker type and register it with
/// [`RegistryConfigBuilder::with_schema`](crate::RegistryConfigBuilder::with_schema).
pub trait SettingsSchema {
    /// All settings in declaration order
    fn settings() -> Vec<SettingSchema>;

    /// Cross-setting rules checked after every change
    #[must_use]
    fn rules() -> Vec<CrossRule> {
        Vec::new()
    }
}

// Empty table, for registries assembled from ad hoc declarations
impl SettingsSchema for () {
    fn settings() -> Vec<SettingSchema> {
        Vec::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
