//! Common test utilities for axiom-settings integration tests
//!
//! Provides shared test schemas, a map-backed environment and fixture helpers.

#![allow(dead_code)]

use axiom_settings::{
    CrossRule, EnvSource, SettingSchema, SettingsRegistry, SettingsSchema, Validator,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// =============================================================================
// Logging
// =============================================================================

/// Route library logs through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Test Settings Schema
// =============================================================================

/// A service-style schema covering every setting type
pub struct TestSettings;

impl SettingsSchema for TestSettings {
    fn settings() -> Vec<SettingSchema> {
        vec![
            SettingSchema::int("RETRY_LIMIT", 3)
                .range(0, 10)
                .description("How many times to retry a failed request"),
            SettingSchema::list("FEATURE_FLAGS", &[]).description("Enabled feature flags"),
            SettingSchema::bool("LOG_GCP_ENABLED", false),
            SettingSchema::string("LOG_GCP_PROJECT", ""),
            SettingSchema::string("MODE", "standard").one_of(["standard", "strict"]),
            SettingSchema::object("LIMITS", json!({"burst": 10})),
            SettingSchema::string("REGION", "eu-west1").pattern(r"^[a-z]+-[a-z]+\d$"),
            SettingSchema::string("SERVICE_NAME", "axiom").validator(Validator::new(
                "lowercase",
                |_, value| {
                    Ok(Value::String(
                        value.as_str().unwrap_or_default().to_lowercase(),
                    ))
                },
            )),
        ]
    }

    fn rules() -> Vec<CrossRule> {
        vec![CrossRule::requires_when("LOG_GCP_ENABLED", "LOG_GCP_PROJECT")]
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Environment backed by a map, so tests never touch the process environment
#[derive(Default)]
pub struct MapEnv {
    vars: Mutex<HashMap<String, String>>,
}

impl MapEnv {
    pub fn new<const N: usize>(vars: [(&str, &str); N]) -> Arc<Self> {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(Self {
            vars: Mutex::new(vars),
        })
    }

    pub fn set(&self, key: &str, value: &str) {
        self.vars
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.lock().unwrap().get(key).cloned()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Registry over [`TestSettings`] with no environment overlay
pub fn registry() -> SettingsRegistry {
    init_logging();
    SettingsRegistry::builder()
        .with_schema::<TestSettings>()
        .without_env()
        .build()
        .unwrap()
}

/// Registry over [`TestSettings`] reading the given environment
pub fn registry_with_env(env: Arc<MapEnv>) -> SettingsRegistry {
    init_logging();
    SettingsRegistry::builder()
        .with_schema::<TestSettings>()
        .with_env_source(env)
        .build()
        .unwrap()
}

/// Records every notification as `(name, value)`
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer(&self) -> impl Fn(&SettingsRegistry, &str, &Value) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |_, name, value| {
            calls.lock().unwrap().push((name.to_string(), value.clone()));
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }
}

/// Temp directory holding overlay files
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        init_logging();
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write `content` to `name` and return the full path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("Failed to write overlay");
        path
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
