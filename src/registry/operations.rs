use super::{SettingsRegistry, Staging};
use crate::config::SettingType;
use crate::error::{Error, Result};
use crate::events::ObserverId;
use crate::parse::json_kind;
use crate::setting::Setting;
use crate::sync::{MutexExt, RwLockExt};

use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Snapshot of one setting's declaration and current value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    pub default: Value,
    pub current: Value,
    pub description: String,
}

impl SettingsRegistry {
    // =========================================================================
    // Queries
    // =========================================================================

    /// Current effective value of a setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] if the name is not declared.
    pub fn query(&self, name: &str) -> Result<Value> {
        let state = self.state.read_recovered();
        Ok(state.setting(name)?.get().clone())
    }

    /// Current value of a setting, deserialized into `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use axiom_settings::{SettingsRegistry, SettingSchema};
    ///
    /// let registry = SettingsRegistry::builder()
    ///     .with_setting(SettingSchema::list("FEATURE_FLAGS", &["a", "b"]))
    ///     .without_env()
    ///     .build()?;
    ///
    /// let flags: Vec<String> = registry.get("FEATURE_FLAGS")?;
    /// assert_eq!(flags, vec!["a", "b"]);
    /// # Ok::<(), axiom_settings::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] for undeclared names, or
    /// [`Error::Parse`] if the value does not fit `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.query(name)?;
        serde_json::from_value(value.clone()).map_err(|e| Error::Parse {
            key: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            input: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Names of all declared settings, in declaration order
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        let state = self.state.read_recovered();
        state.settings.iter().map(|s| s.name().to_string()).collect()
    }

    /// `(name, value)` pairs in declaration order
    #[must_use]
    pub fn list_values(&self) -> Vec<(String, Value)> {
        let state = self.state.read_recovered();
        state
            .settings
            .iter()
            .map(|s| (s.name().to_string(), s.get().clone()))
            .collect()
    }

    /// All current values as a mapping.
    ///
    /// Feeding the result back into [`update_many`](Self::update_many)
    /// changes nothing.
    #[must_use]
    pub fn export_all(&self) -> Map<String, Value> {
        self.state.read_recovered().values()
    }

    /// Declaration and current value of a setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] if the name is not declared.
    pub fn describe(&self, name: &str) -> Result<SettingInfo> {
        let state = self.state.read_recovered();
        let setting = state.setting(name)?;
        let schema = setting.schema();
        Ok(SettingInfo {
            name: schema.name.clone(),
            setting_type: schema.setting_type,
            default: schema.default.clone(),
            current: setting.get().clone(),
            description: schema.description.clone(),
        })
    }

    /// Whether a setting currently holds a value different from its default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] if the name is not declared.
    pub fn is_overridden(&self, name: &str) -> Result<bool> {
        let state = self.state.read_recovered();
        Ok(state.setting(name)?.is_overridden())
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Validate and store a value for one setting.
    ///
    /// Strings are parsed according to the declared type, so `"5"` is accepted
    /// for an int setting. Observers are notified only when the effective value
    /// changes.
    ///
    /// Returns `true` if the value changed.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownSetting`] if the name is not declared
    /// - [`Error::Parse`] / [`Error::Validation`] if the value is rejected;
    ///   the current value is kept
    /// - [`Error::ReentrantUpdate`] when called from inside an observer
    pub fn update_one(&self, name: &str, value: impl Into<Value>) -> Result<bool> {
        self.state.read_recovered().position(name)?;
        let changed = self.commit(vec![(name.to_string(), value.into())], Staging::AllOrNothing)?;
        Ok(changed > 0)
    }

    /// Apply a mapping of setting names to values.
    ///
    /// Every entry is validated before anything is stored: if any entry names
    /// an unknown setting or is rejected, no setting changes. Observers then
    /// hear about each changed setting, in the mapping's order.
    ///
    /// Returns the number of settings that changed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidOverlayShape`] if `values` is not a JSON object
    /// - the first rejection from [`update_one`](Self::update_one) otherwise
    pub fn update_many(&self, values: &Value) -> Result<usize> {
        let Value::Object(map) = values else {
            return Err(Error::InvalidOverlayShape(json_kind(values).to_string()));
        };
        let entries = map
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let changed = self.commit(entries, Staging::AllOrNothing)?;
        debug!("Batch update changed {changed} setting(s)");
        Ok(changed)
    }

    /// Restore every setting to its default.
    ///
    /// Observers are not notified; a reset is a wholesale restart of the
    /// configuration rather than a change to react to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReentrantUpdate`] when called from inside an observer.
    pub fn reset_all(&self) -> Result<()> {
        Self::ensure_not_dispatching("reset_all")?;
        let _gate = self.write_gate.lock_recovered();
        let cleared = {
            let mut state = self.state.write_recovered();
            state
                .settings
                .iter_mut()
                .map(Setting::reset)
                .filter(|cleared| *cleared)
                .count()
        };
        self.report_rules();
        info!("Reset all settings to defaults ({cleared} override(s) cleared)");
        Ok(())
    }

    /// Restore one setting to its default, without notifying observers.
    ///
    /// Returns `true` if an override was cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] for undeclared names, or
    /// [`Error::ReentrantUpdate`] when called from inside an observer.
    pub fn reset_one(&self, name: &str) -> Result<bool> {
        Self::ensure_not_dispatching(name)?;
        let _gate = self.write_gate.lock_recovered();
        let cleared = self.state.write_recovered().setting_mut(name)?.reset();
        if cleared {
            self.report_rules();
            info!("Reset {name} to default");
        }
        Ok(cleared)
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register an observer for one setting.
    ///
    /// The callback receives `(registry, name, new_value)` after every
    /// effective change of that setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] if the name is not declared.
    pub fn add_observer<F>(&self, name: &str, observer: F) -> Result<ObserverId>
    where
        F: Fn(&SettingsRegistry, &str, &Value) + Send + Sync + 'static,
    {
        let mut state = self.state.write_recovered();
        let id = state.setting_mut(name)?.add_observer(Arc::new(observer));
        debug!("Registered observer {id:?} on {name}");
        Ok(id)
    }

    /// Remove an observer from one setting.
    ///
    /// Returns `false` if the handle was not registered on that setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSetting`] if the name is not declared.
    pub fn remove_observer(&self, name: &str, id: ObserverId) -> Result<bool> {
        let mut state = self.state.write_recovered();
        Ok(state.setting_mut(name)?.remove_observer(id))
    }

    /// Register an observer notified of changes to any setting
    pub fn add_global_observer<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&SettingsRegistry, &str, &Value) + Send + Sync + 'static,
    {
        let id = self
            .state
            .write_recovered()
            .global_observers
            .add(Arc::new(observer));
        debug!("Registered global observer {id:?}");
        id
    }

    /// Remove a global observer; returns `false` for unknown handles
    pub fn remove_global_observer(&self, id: ObserverId) -> bool {
        self.state.write_recovered().global_observers.remove(id)
    }
}
