//! Registry Workflow Integration Tests
//!
//! Tests for the complete settings lifecycle including:
//! - Defaults after initialization
//! - Environment overlay and type parsing
//! - Single and batch updates
//! - Reset functionality
//! - Cross-setting rules

mod common;

use axiom_settings::{Error, SettingsRegistry};
use common::{MapEnv, Recorder, TestSettings, registry, registry_with_env};
use serde_json::{Value, json};

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_defaults_after_init() {
    let registry = registry();

    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(3));
    assert_eq!(registry.query("FEATURE_FLAGS").unwrap(), json!([]));
    assert_eq!(registry.query("LOG_GCP_ENABLED").unwrap(), json!(false));
    assert_eq!(registry.query("LIMITS").unwrap(), json!({"burst": 10}));

    for name in registry.list_names() {
        assert!(!registry.is_overridden(&name).unwrap(), "{name}");
    }
}

#[test]
fn test_list_names_in_declaration_order() {
    let registry = registry();
    let names = registry.list_names();
    assert_eq!(names.first().map(String::as_str), Some("RETRY_LIMIT"));
    assert_eq!(names.len(), 8);

    let values = registry.list_values();
    assert_eq!(values[0], ("RETRY_LIMIT".to_string(), json!(3)));
}

#[test]
fn test_empty_registry() {
    let registry = SettingsRegistry::builder().without_env().build().unwrap();
    assert!(registry.is_empty());
    assert!(registry.export_all().is_empty());
    assert_eq!(registry.update_many(&json!({})).unwrap(), 0);
}

// =============================================================================
// Environment Overlay
// =============================================================================

#[test]
fn test_env_int_then_reset() {
    let registry = registry_with_env(MapEnv::new([("RETRY_LIMIT", "5")]));
    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(5));

    registry.reset_all().unwrap();
    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(3));
}

#[test]
fn test_env_list_is_split_and_trimmed() {
    let registry = registry_with_env(MapEnv::new([("FEATURE_FLAGS", "a, b ,c")]));
    assert_eq!(registry.query("FEATURE_FLAGS").unwrap(), json!(["a", "b", "c"]));
}

#[test]
fn test_env_bool_spellings() {
    for raw in ["true", "1", "t", "y", "yes", "TRUE", "Yes", "T"] {
        let registry = registry_with_env(MapEnv::new([("LOG_GCP_ENABLED", raw)]));
        assert_eq!(registry.query("LOG_GCP_ENABLED").unwrap(), json!(true), "{raw}");
    }
    for raw in ["false", "0", "f", "n", "no", "NO"] {
        let registry = registry_with_env(MapEnv::new([("LOG_GCP_ENABLED", raw)]));
        assert_eq!(registry.query("LOG_GCP_ENABLED").unwrap(), json!(false), "{raw}");
    }
}

#[test]
fn test_env_bad_value_keeps_default() {
    let env = MapEnv::new([
        ("LOG_GCP_ENABLED", "maybe"),
        ("RETRY_LIMIT", "lots"),
        ("MODE", "strict"),
    ]);
    let registry = registry_with_env(env);

    assert_eq!(registry.query("LOG_GCP_ENABLED").unwrap(), json!(false));
    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(3));
    // the valid variable still applies
    assert_eq!(registry.query("MODE").unwrap(), json!("strict"));
}

#[test]
fn test_env_object_setting() {
    let registry = registry_with_env(MapEnv::new([("LIMITS", r#"{"burst": 20, "rate": 5}"#)]));
    assert_eq!(registry.query("LIMITS").unwrap(), json!({"burst": 20, "rate": 5}));

    let registry = registry_with_env(MapEnv::new([("LIMITS", "[1, 2]")]));
    assert_eq!(registry.query("LIMITS").unwrap(), json!({"burst": 10}));
}

#[test]
fn test_env_prefix() {
    common::init_logging();
    let env = MapEnv::new([("RETRY_LIMIT", "9"), ("SVC_RETRY_LIMIT", "6")]);
    let registry = SettingsRegistry::builder()
        .with_schema::<TestSettings>()
        .with_env_prefix("svc")
        .with_env_source(env)
        .build()
        .unwrap();

    assert_eq!(registry.env_var_name("RETRY_LIMIT"), "SVC_RETRY_LIMIT");
    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(6));
}

#[test]
fn test_reapply_environment_notifies() {
    let env = MapEnv::new([]);
    let registry = registry_with_env(env.clone());
    let recorder = Recorder::new();
    registry.add_global_observer(recorder.observer());

    env.set("RETRY_LIMIT", "8");
    env.set("MODE", "chaotic");
    assert_eq!(registry.apply_environment_overlay().unwrap(), 1);
    assert_eq!(recorder.calls(), vec![("RETRY_LIMIT".to_string(), json!(8))]);

    // unchanged on the second pass
    assert_eq!(registry.apply_environment_overlay().unwrap(), 0);
    assert_eq!(recorder.calls().len(), 1);
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_update_one_rejection_keeps_value() {
    let registry = registry();
    registry.update_one("RETRY_LIMIT", 4).unwrap();

    let err = registry.update_one("RETRY_LIMIT", 11).unwrap_err();
    assert!(err.is_rejection());
    let err = registry.update_one("RETRY_LIMIT", "four").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    let err = registry.update_one("RETRY_LIMIT", json!([4])).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(4));
}

#[test]
fn test_validators_normalize_and_constrain() {
    let registry = registry();

    registry.update_one("SERVICE_NAME", "Axiom-Worker").unwrap();
    assert_eq!(registry.query("SERVICE_NAME").unwrap(), json!("axiom-worker"));

    assert!(registry.update_one("MODE", "loose").is_err());
    assert!(registry.update_one("REGION", "Europe").is_err());
    registry.update_one("REGION", "us-east4").unwrap();
    assert_eq!(registry.query("REGION").unwrap(), json!("us-east4"));
}

#[test]
fn test_update_many_applies_batch() {
    let registry = registry();
    let changed = registry
        .update_many(&json!({
            "RETRY_LIMIT": "7",
            "FEATURE_FLAGS": ["beta"],
            "MODE": "strict",
        }))
        .unwrap();

    assert_eq!(changed, 3);
    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(7));
    assert_eq!(registry.query("FEATURE_FLAGS").unwrap(), json!(["beta"]));
}

#[test]
fn test_update_many_rejection_changes_nothing() {
    let registry = registry();
    let recorder = Recorder::new();
    registry.add_global_observer(recorder.observer());

    let result = registry.update_many(&json!({"MODE": "strict", "RETRY_LIMIT": 99}));
    assert!(result.is_err());
    assert_eq!(registry.query("MODE").unwrap(), json!("standard"));
    assert!(recorder.calls().is_empty());
}

#[test]
fn test_update_many_non_mapping() {
    let registry = registry();
    for payload in [json!([1, 2]), json!("RETRY_LIMIT=5"), json!(5), Value::Null] {
        let err = registry.update_many(&payload).unwrap_err();
        assert!(matches!(err, Error::InvalidOverlayShape(_)), "{payload}");
    }
    assert_eq!(registry.export_all(), common::registry().export_all());
}

#[test]
fn test_export_roundtrip_changes_nothing() {
    let registry = registry();
    registry
        .update_many(&json!({"RETRY_LIMIT": 2, "LOG_GCP_PROJECT": "proj-1"}))
        .unwrap();
    let recorder = Recorder::new();
    registry.add_global_observer(recorder.observer());

    let exported = Value::Object(registry.export_all());
    assert_eq!(registry.update_many(&exported).unwrap(), 0);
    assert!(recorder.calls().is_empty());
    assert!(registry.last_validation_failure().is_none());
}

// =============================================================================
// Reset
// =============================================================================

#[test]
fn test_reset_all_restores_defaults_silently() {
    let registry = registry();
    let recorder = Recorder::new();
    registry
        .update_many(&json!({"RETRY_LIMIT": 9, "FEATURE_FLAGS": "x,y"}))
        .unwrap();
    registry.add_global_observer(recorder.observer());

    registry.reset_all().unwrap();

    assert_eq!(registry.export_all(), common::registry().export_all());
    assert!(recorder.calls().is_empty());
}

#[test]
fn test_setting_default_clears_override() {
    let registry = registry();
    registry.update_one("RETRY_LIMIT", 6).unwrap();
    assert!(registry.is_overridden("RETRY_LIMIT").unwrap());

    assert!(registry.update_one("RETRY_LIMIT", 3).unwrap());
    assert!(!registry.is_overridden("RETRY_LIMIT").unwrap());
}

// =============================================================================
// Cross-setting rules
// =============================================================================

#[test]
fn test_gcp_rule_is_reported_not_enforced() {
    let registry = registry();

    assert!(registry.update_one("LOG_GCP_ENABLED", true).unwrap());
    assert_eq!(registry.query("LOG_GCP_ENABLED").unwrap(), json!(true));

    let failure = registry.last_validation_failure().unwrap();
    assert!(failure.contains("LOG_GCP_PROJECT cannot be empty"), "{failure}");
    assert!(matches!(
        registry.validate_all(),
        Err(Error::CrossValidation { .. })
    ));

    registry.update_one("LOG_GCP_PROJECT", "my-project").unwrap();
    assert!(registry.last_validation_failure().is_none());
    assert!(registry.validate_all().is_ok());
}

#[test]
fn test_rule_checked_at_init() {
    let registry = registry_with_env(MapEnv::new([("LOG_GCP_ENABLED", "yes")]));
    assert_eq!(registry.query("LOG_GCP_ENABLED").unwrap(), json!(true));
    assert!(registry.last_validation_failure().is_some());
}

// =============================================================================
// Introspection
// =============================================================================

#[test]
fn test_describe_and_display() {
    let registry = registry();
    registry.update_one("RETRY_LIMIT", 5).unwrap();

    let info = registry.describe("RETRY_LIMIT").unwrap();
    assert_eq!(info.current, json!(5));
    assert_eq!(info.default, json!(3));
    assert_eq!(
        serde_json::to_value(&info).unwrap()["type"],
        json!("int")
    );

    let text = registry.to_string();
    assert!(text.starts_with("RETRY_LIMIT: 5\n"));
    assert!(text.contains("MODE: \"standard\""));
    assert!(registry.describe("MISSING").unwrap_err().is_not_found());
}
