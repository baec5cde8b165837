//! The settings registry
//!
//! This module contains the [`SettingsRegistry`] struct, the primary entry
//! point for declaring, sourcing, validating, mutating and observing settings.
//!
//! # Locking
//!
//! - `state` (`RwLock`) guards the settings table and the global observer list.
//!   Queries take it shared; mutations take it exclusively while staging and
//!   committing values.
//! - `write_gate` (`Mutex`) serializes whole mutations, including the
//!   cross-setting pass and observer dispatch, so notifications from two
//!   writers never interleave.
//!
//! Observers run with `state` released, so they may query the registry or
//! register further observers. Mutating the registry from inside an observer
//! returns [`Error::ReentrantUpdate`].

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::events::{self, Observer, ObserverList, PendingChange};
use crate::setting::Setting;
use crate::sync::{MutexExt, RwLockExt};
use crate::validation::{CrossRule, check_rules};

use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock, RwLock};

mod builder;
mod env;
mod io;
mod operations;

pub use builder::SettingsRegistryBuilder;
pub use operations::SettingInfo;

use env::EnvironmentHandler;

/// Process-wide instance, see [`SettingsRegistry::init_shared`]
static SHARED: OnceLock<SettingsRegistry> = OnceLock::new();

/// Registry of named, typed settings.
///
/// # Example
///
/// ```rust
/// use axiom_settings::{SettingsRegistry, SettingSchema};
/// use serde_json::json;
///
/// let registry = SettingsRegistry::builder()
///     .with_setting(SettingSchema::int("RETRY_LIMIT", 3).range(0, 10))
///     .without_env()
///     .build()?;
///
/// registry.add_observer("RETRY_LIMIT", |_registry, name, value| {
///     println!("{name} changed to {value}");
/// })?;
///
/// registry.update_one("RETRY_LIMIT", json!(5))?;
/// assert_eq!(registry.query("RETRY_LIMIT")?, json!(5));
/// # Ok::<(), axiom_settings::Error>(())
/// ```
pub struct SettingsRegistry {
    /// Settings table and global observers
    pub(crate) state: RwLock<RegistryState>,

    /// Serializes mutations end to end (commit, cross-setting pass, dispatch)
    pub(crate) write_gate: Mutex<()>,

    /// Cross-setting rules
    pub(crate) rules: Vec<CrossRule>,

    /// Environment variable lookups
    pub(crate) env_handler: EnvironmentHandler,

    /// Message of the most recent failing cross-setting pass
    pub(crate) last_rule_failure: Mutex<Option<String>>,
}

pub(crate) struct RegistryState {
    /// Settings in declaration order
    pub settings: Vec<Setting>,
    /// Name -> position in `settings`
    pub index: HashMap<String, usize>,
    /// Observers notified of every change
    pub global_observers: ObserverList,
}

impl RegistryState {
    pub fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownSetting(name.to_string()))
    }

    pub fn setting(&self, name: &str) -> Result<&Setting> {
        let pos = self.position(name)?;
        Ok(&self.settings[pos])
    }

    pub fn setting_mut(&mut self, name: &str) -> Result<&mut Setting> {
        let pos = self.position(name)?;
        Ok(&mut self.settings[pos])
    }

    pub fn values(&self) -> Map<String, Value> {
        self.settings
            .iter()
            .map(|s| (s.name().to_string(), s.get().clone()))
            .collect()
    }
}

/// How a batch reacts to a rejected entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Staging {
    /// Any rejection aborts the batch before anything is stored
    AllOrNothing,
    /// Rejected entries are logged and skipped
    SkipRejected,
}

impl SettingsRegistry {
    /// Create a builder for `SettingsRegistry` with a fluent API.
    #[must_use]
    pub fn builder() -> SettingsRegistryBuilder {
        SettingsRegistryBuilder::new()
    }

    /// Build and initialize a registry.
    ///
    /// Creates one [`Setting`] per declaration, applies the environment
    /// overlay (unless disabled), then runs the cross-setting rules once. A
    /// failing rule is reported but does not fail construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if a name is declared twice or a
    /// default does not satisfy its own type and validators.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let RegistryConfig {
            settings: declarations,
            rules,
            env_prefix,
            env_source,
            load_env,
        } = config;

        let mut settings = Vec::with_capacity(declarations.len());
        let mut index = HashMap::with_capacity(declarations.len());
        for schema in declarations {
            schema
                .validate_schema()
                .map_err(|reason| Error::InvalidSchema {
                    key: schema.name.clone(),
                    reason,
                })?;
            if index.contains_key(&schema.name) {
                return Err(Error::InvalidSchema {
                    key: schema.name.clone(),
                    reason: "declared more than once".to_string(),
                });
            }
            index.insert(schema.name.clone(), settings.len());
            settings.push(Setting::new(schema));
        }

        let registry = Self {
            state: RwLock::new(RegistryState {
                settings,
                index,
                global_observers: ObserverList::new(),
            }),
            write_gate: Mutex::new(()),
            rules,
            env_handler: EnvironmentHandler::new(env_prefix, env_source),
            last_rule_failure: Mutex::new(None),
        };

        if load_env {
            let entries = registry.environment_entries();
            // Nobody can have subscribed yet, so the changes need no dispatch.
            let (changes, _) = registry.store(entries, Staging::SkipRejected)?;
            if !changes.is_empty() {
                info!("Applied {} setting(s) from the environment", changes.len());
            }
        }
        registry.report_rules();

        info!(
            "Initialized settings registry with {} settings",
            registry.len()
        );
        Ok(registry)
    }

    // =========================================================================
    // Shared instance
    // =========================================================================

    /// Initialize the process-wide registry, or return it if it already exists.
    ///
    /// The first successful caller constructs the registry from `config`;
    /// every later call (including concurrent ones) receives that same
    /// instance and its `config` is discarded.
    ///
    /// # Errors
    ///
    /// Returns construction errors from [`SettingsRegistry::new`]; the shared
    /// slot stays empty in that case.
    pub fn init_shared(config: RegistryConfig) -> Result<&'static SettingsRegistry> {
        if let Some(existing) = SHARED.get() {
            return Ok(existing);
        }
        let registry = Self::new(config)?;
        Ok(SHARED.get_or_init(|| registry))
    }

    /// The process-wide registry, if [`init_shared`](Self::init_shared) has run
    #[must_use]
    pub fn shared() -> Option<&'static SettingsRegistry> {
        SHARED.get()
    }

    // =========================================================================
    // Mutation machinery
    // =========================================================================

    pub(crate) fn ensure_not_dispatching(what: &str) -> Result<()> {
        if events::in_dispatch() {
            return Err(Error::ReentrantUpdate(what.to_string()));
        }
        Ok(())
    }

    /// Validate, store and announce a batch of candidate values.
    ///
    /// Returns the number of settings whose effective value changed.
    pub(crate) fn commit(&self, entries: Vec<(String, Value)>, staging: Staging) -> Result<usize> {
        let Some((first, _)) = entries.first() else {
            return Ok(0);
        };
        Self::ensure_not_dispatching(first)?;

        let _gate = self.write_gate.lock_recovered();
        let (changes, global) = self.store(entries, staging)?;
        if changes.is_empty() {
            return Ok(0);
        }

        self.report_rules();
        events::dispatch(self, &changes, &global);
        Ok(changes.len())
    }

    /// Stage every entry, then store the accepted ones under the write lock.
    ///
    /// Returns the committed changes and a snapshot of the global observers.
    fn store(
        &self,
        entries: Vec<(String, Value)>,
        staging: Staging,
    ) -> Result<(Vec<PendingChange>, Vec<Observer>)> {
        let mut state = self.state.write_recovered();

        let mut accepted = Vec::with_capacity(entries.len());
        for (name, candidate) in entries {
            let staged = state
                .position(&name)
                .and_then(|pos| Ok((pos, state.settings[pos].stage(candidate)?)));
            match staged {
                Ok((pos, Some(value))) => accepted.push((pos, value)),
                Ok((_, None)) => {}
                Err(e) if staging == Staging::SkipRejected => {
                    warn!("Ignoring value for {name}: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        let changes = accepted
            .into_iter()
            .map(|(pos, value)| state.settings[pos].commit(value))
            .collect();
        Ok((changes, state.global_observers.snapshot()))
    }

    /// Run the cross-setting rules and report (but tolerate) a failure
    pub(crate) fn report_rules(&self) {
        let outcome = self.validate_all();
        let mut last = self.last_rule_failure.lock_recovered();
        match outcome {
            Ok(()) => *last = None,
            Err(e) => {
                warn!("Settings validation error: {e}");
                *last = Some(e.to_string());
            }
        }
    }

    /// Check every cross-setting rule against the current values.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::CrossValidation`] failure.
    pub fn validate_all(&self) -> Result<()> {
        let values = self.export_all();
        check_rules(&self.rules, &values)
    }

    /// Message of the most recent failing cross-setting pass.
    ///
    /// Cleared whenever a pass succeeds. Cross-setting failures never block an
    /// update, so this is how callers inspect them after the fact.
    #[must_use]
    pub fn last_validation_failure(&self) -> Option<String> {
        self.last_rule_failure.lock_recovered().clone()
    }

    /// Number of declared settings
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read_recovered().settings.len()
    }

    /// True if no settings are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SettingsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read_recovered();
        for (i, setting) in state.settings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", setting.name(), setting.get())?;
        }
        Ok(())
    }
}

impl fmt::Debug for SettingsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read_recovered();
        f.debug_struct("SettingsRegistry")
            .field("settings", &state.values())
            .field("rules", &self.rules)
            .field("global_observers", &state.global_observers.len())
            .finish_non_exhaustive()
    }
}
