//! A single typed setting slot
//!
//! A [`Setting`] binds a [`SettingSchema`] to an optional override. The
//! effective value is the override when present, otherwise the schema default.
//! Overrides are only stored after passing the type check and the full
//! validator chain.
//!
//! Settings live inside a [`SettingsRegistry`](crate::SettingsRegistry), which
//! serializes mutation and delivers observer notifications. A standalone
//! `Setting` can still be validated and mutated directly, but it carries no
//! observers of its own: register them through
//! [`SettingsRegistry::add_observer`](crate::SettingsRegistry::add_observer).
//!
//! ```compile_fail
//! use axiom_settings::{SettingSchema, Setting};
//! use std::sync::Arc;
//!
//! let mut setting = Setting::new(SettingSchema::int("RETRY_LIMIT", 3));
//! setting.add_observer(Arc::new(|_, _, _| {}));
//! ```

use crate::config::SettingSchema;
use crate::error::Result;
use crate::events::{Observer, ObserverId, ObserverList, PendingChange};
use serde_json::Value;
use std::sync::Arc;

/// Runtime instance of a declared setting
#[derive(Debug, Clone)]
pub struct Setting {
    schema: Arc<SettingSchema>,
    value: Option<Value>,
    observers: ObserverList,
}

impl Setting {
    /// Create a setting with no override
    #[must_use]
    pub fn new(schema: SettingSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            value: None,
            observers: ObserverList::new(),
        }
    }

    /// Setting name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Static declaration
    #[must_use]
    pub fn schema(&self) -> &SettingSchema {
        &self.schema
    }

    /// Effective value: the override if present, else the default
    #[must_use]
    pub fn get(&self) -> &Value {
        self.value.as_ref().unwrap_or(&self.schema.default)
    }

    /// Whether an override differing from the default is stored
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.value.is_some()
    }

    /// Validate and store a new value.
    ///
    /// Returns `true` if the effective value changed. A candidate equal to the
    /// current effective value (after coercion) is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](crate::Error::Parse) or
    /// [`Error::Validation`](crate::Error::Validation); the setting is left
    /// unchanged.
    pub fn set(&mut self, candidate: Value) -> Result<bool> {
        Ok(self.apply(candidate)?.is_some())
    }

    /// Clear the override. Never notifies observers.
    ///
    /// Returns `true` if an override was cleared.
    pub fn reset(&mut self) -> bool {
        self.value.take().is_some()
    }

    /// Register an observer, notified when the owning registry commits a change
    pub(crate) fn add_observer(&mut self, observer: Observer) -> ObserverId {
        self.observers.add(observer)
    }

    /// Remove an observer; unknown handles are ignored and return `false`
    pub(crate) fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    // =========================================================================
    // Two-phase update used by the registry
    // =========================================================================

    /// Validate a candidate without touching state.
    ///
    /// Returns `None` when the accepted value equals the current effective
    /// value.
    pub(crate) fn stage(&self, candidate: Value) -> Result<Option<Value>> {
        let accepted = self.schema.validate(candidate)?;
        if accepted == *self.get() {
            log::debug!("Setting {} unchanged, skipping", self.name());
            return Ok(None);
        }
        Ok(Some(accepted))
    }

    /// Store an already validated value and capture who must hear about it.
    ///
    /// A value equal to the default clears the override instead of storing a
    /// copy of it.
    pub(crate) fn commit(&mut self, accepted: Value) -> PendingChange {
        self.value = if accepted == self.schema.default {
            None
        } else {
            Some(accepted.clone())
        };
        log::debug!("Setting {} = {accepted}", self.name());
        PendingChange {
            name: self.name().to_string(),
            value: accepted,
            observers: self.observers.snapshot(),
        }
    }

    pub(crate) fn apply(&mut self, candidate: Value) -> Result<Option<PendingChange>> {
        Ok(self.stage(candidate)?.map(|accepted| self.commit(accepted)))
    }
}
