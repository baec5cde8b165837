//! Per-setting validators and cross-setting rules
//!
//! A [`Validator`] sees one candidate value and either accepts it (possibly
//! normalized) or rejects it. A [`CrossRule`] sees the full map of effective
//! values and is only advisory: the registry reports a failing rule but keeps
//! the change that triggered it.

use crate::error::{Error, Result};
use crate::parse::json_kind;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Type alias for a validator function: `(setting_name, candidate) -> accepted`
pub type ValidatorFn = Arc<dyn Fn(&str, Value) -> std::result::Result<Value, String> + Send + Sync>;

/// Type alias for a cross-setting check over all effective values
pub type RuleFn = Arc<dyn Fn(&Map<String, Value>) -> std::result::Result<(), String> + Send + Sync>;

// =============================================================================
// Validator
// =============================================================================

/// A named per-setting validator
#[derive(Clone)]
pub struct Validator {
    name: String,
    check: ValidatorFn,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.name).finish()
    }
}

impl Validator {
    /// Create a validator from a closure.
    ///
    /// The closure receives the setting name and the type-checked candidate and
    /// returns the value to store, or a rejection reason.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Create a validator from a plain predicate
    pub fn predicate<F>(name: impl Into<String>, reason: impl Into<String>, accept: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let reason = reason.into();
        Self::new(name, move |_, value| {
            if accept(&value) {
                Ok(value)
            } else {
                Err(reason.clone())
            }
        })
    }

    /// Validator name (used in logs and debug output)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the validator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] carrying the rejection reason.
    pub fn check(&self, setting: &str, candidate: Value) -> Result<Value> {
        (self.check)(setting, candidate).map_err(|reason| Error::validation(setting, reason))
    }

    // =========================================================================
    // Built-in validators
    // =========================================================================

    /// Accept only the listed values
    pub fn one_of<I, V>(allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
        let listing = allowed
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self::new("one_of", move |_, value| {
            if allowed.contains(&value) {
                Ok(value)
            } else {
                Err(format!("must be one of [{listing}], got {value}"))
            }
        })
    }

    /// Accept integers within `min..=max`
    pub fn range(min: i64, max: i64) -> Self {
        Self::new("range", move |_, value| match value.as_i64() {
            Some(n) if n < min => Err(format!("must be at least {min}, got {n}")),
            Some(n) if n > max => Err(format!("must be at most {max}, got {n}")),
            Some(_) => Ok(value),
            None => Err(format!("must be an integer, got {}", json_kind(&value))),
        })
    }

    /// Accept strings matching a regex.
    ///
    /// An invalid pattern produces a validator that rejects everything, which
    /// surfaces as an invalid default when the registry is built.
    pub fn pattern(pattern: &str) -> Self {
        match regex::Regex::new(pattern) {
            Ok(re) => Self::new("pattern", move |_, value| {
                let text = value.as_str().unwrap_or_default();
                if re.is_match(text) {
                    Ok(value)
                } else {
                    Err(format!("does not match pattern: {}", re.as_str()))
                }
            }),
            Err(e) => {
                let reason = format!("invalid regex pattern: {e}");
                Self::new("pattern", move |_, _| Err(reason.clone()))
            }
        }
    }

    /// Reject empty strings, lists and objects
    pub fn non_empty() -> Self {
        Self::new("non_empty", |_, value| {
            let empty = match &value {
                Value::String(s) => s.trim().is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
                Value::Null => true,
                Value::Bool(_) | Value::Number(_) => false,
            };
            if empty {
                Err("cannot be empty".to_string())
            } else {
                Ok(value)
            }
        })
    }
}

// =============================================================================
// Cross-setting rules
// =============================================================================

/// A named rule spanning several settings
#[derive(Clone)]
pub struct CrossRule {
    name: String,
    check: RuleFn,
}

impl fmt::Debug for CrossRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CrossRule").field(&self.name).finish()
    }
}

impl CrossRule {
    /// Create a rule from a closure over all effective values
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// When boolean setting `flag` is true, setting `dependent` must be non-empty.
    ///
    /// ```
    /// use axiom_settings::CrossRule;
    /// use serde_json::{json, Map};
    ///
    /// let rule = CrossRule::requires_when("LOG_GCP_ENABLED", "LOG_GCP_PROJECT");
    /// let mut values = Map::new();
    /// values.insert("LOG_GCP_ENABLED".into(), json!(true));
    /// values.insert("LOG_GCP_PROJECT".into(), json!(""));
    /// assert!(rule.check(&values).is_err());
    /// ```
    pub fn requires_when(flag: &str, dependent: &str) -> Self {
        let flag = flag.to_string();
        let dependent = dependent.to_string();
        Self::new(format!("{flag} requires {dependent}"), move |values| {
            let enabled = values.get(&flag).and_then(Value::as_bool).unwrap_or(false);
            if !enabled {
                return Ok(());
            }
            let missing = match values.get(&dependent) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                Some(Value::Object(map)) => map.is_empty(),
                Some(_) => false,
            };
            if missing {
                Err(format!("{dependent} cannot be empty when {flag} is enabled"))
            } else {
                Ok(())
            }
        })
    }

    /// Rule name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CrossValidation`] if the rule is violated.
    pub fn check(&self, values: &Map<String, Value>) -> Result<()> {
        (self.check)(values).map_err(|reason| Error::CrossValidation {
            rule: self.name.clone(),
            reason,
        })
    }
}

/// Run every rule, returning the first failure
pub(crate) fn check_rules(rules: &[CrossRule], values: &Map<String, Value>) -> Result<()> {
    for rule in rules {
        rule.check(values)?;
    }
    Ok(())
}
