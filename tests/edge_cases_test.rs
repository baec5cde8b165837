//! Edge Cases Integration Tests
//!
//! Tests for edge cases, error conditions, and boundary behaviors:
//! - Invalid declarations
//! - Type coercion corner cases
//! - Typed reads
//! - Poisoned locks

mod common;

use axiom_settings::{
    CrossRule, Error, RegistryConfig, SettingSchema, SettingType, SettingsRegistry, Validator,
};
use common::{MapEnv, registry};
use serde_json::json;
use std::sync::Arc;

// =============================================================================
// Invalid Declarations
// =============================================================================

#[test]
fn test_default_of_wrong_type() {
    let result = SettingsRegistry::builder()
        .with_setting(SettingSchema::object("LIMITS", json!([1, 2])))
        .without_env()
        .build();
    let err = result.unwrap_err();
    assert!(matches!(err, Error::InvalidSchema { ref key, .. } if key == "LIMITS"));
}

#[test]
fn test_empty_name_rejected() {
    let result = SettingsRegistry::builder()
        .with_setting(SettingSchema::bool(" ", true))
        .without_env()
        .build();
    assert!(matches!(result, Err(Error::InvalidSchema { .. })));
}

#[test]
fn test_invalid_regex_fails_at_build() {
    let result = SettingsRegistry::builder()
        .with_setting(SettingSchema::string("REGION", "eu").pattern("(["))
        .without_env()
        .build();
    assert!(matches!(result, Err(Error::InvalidSchema { .. })));
}

#[test]
fn test_duplicate_across_tables() {
    let config = RegistryConfig::builder()
        .with_schema::<common::TestSettings>()
        .with_setting(SettingSchema::int("RETRY_LIMIT", 1))
        .without_env()
        .build();
    let err = SettingsRegistry::new(config).unwrap_err();
    assert!(err.to_string().contains("declared more than once"));
}

// =============================================================================
// Coercion
// =============================================================================

#[test]
fn test_int_edge_values() {
    let registry = SettingsRegistry::builder()
        .with_setting(SettingSchema::int("OFFSET", 0))
        .without_env()
        .build()
        .unwrap();

    registry.update_one("OFFSET", "-42").unwrap();
    assert_eq!(registry.query("OFFSET").unwrap(), json!(-42));
    registry.update_one("OFFSET", i64::MAX).unwrap();
    assert_eq!(registry.get::<i64>("OFFSET").unwrap(), i64::MAX);

    assert!(registry.update_one("OFFSET", "1.5").is_err());
    assert!(registry.update_one("OFFSET", 1.5).is_err());
    assert!(registry.update_one("OFFSET", "").is_err());
    assert_eq!(registry.get::<i64>("OFFSET").unwrap(), i64::MAX);
}

#[test]
fn test_string_setting_is_passthrough() {
    let registry = registry();
    registry.update_one("LOG_GCP_PROJECT", "  true  ").unwrap();
    assert_eq!(registry.query("LOG_GCP_PROJECT").unwrap(), json!("  true  "));

    // non-strings are not stringified
    let err = registry.update_one("LOG_GCP_PROJECT", 5).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn test_list_rejects_non_string_items() {
    let registry = registry();
    assert!(registry.update_one("FEATURE_FLAGS", json!([1, 2])).is_err());
    registry.update_one("FEATURE_FLAGS", "").unwrap();
    assert_eq!(registry.query("FEATURE_FLAGS").unwrap(), json!([]));
}

#[test]
fn test_object_parse_error_mentions_position() {
    let registry = registry();
    let err = registry.update_one("LIMITS", "{\"burst\": }").unwrap_err();
    match err {
        Error::Parse { key, expected, .. } => {
            assert_eq!(key, "LIMITS");
            assert_eq!(expected, SettingType::Object.to_string());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_env_whitespace_bool_rejected() {
    let registry = common::registry_with_env(MapEnv::new([("LOG_GCP_ENABLED", " yes")]));
    assert_eq!(registry.query("LOG_GCP_ENABLED").unwrap(), json!(false));
}

// =============================================================================
// Typed reads
// =============================================================================

#[test]
fn test_typed_get() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Limits {
        burst: u32,
    }

    let registry = registry();
    assert_eq!(registry.get::<Limits>("LIMITS").unwrap(), Limits { burst: 10 });
    assert_eq!(registry.get::<Vec<String>>("FEATURE_FLAGS").unwrap(), Vec::<String>::new());
    assert!(matches!(
        registry.get::<bool>("RETRY_LIMIT"),
        Err(Error::Parse { .. })
    ));
    assert!(registry.get::<bool>("NOPE").unwrap_err().is_not_found());
}

// =============================================================================
// Custom validators and rules
// =============================================================================

#[test]
fn test_first_failing_validator_wins() {
    let registry = SettingsRegistry::builder()
        .with_setting(
            SettingSchema::string("CODE", "AB")
                .validator(Validator::predicate("upper", "must be uppercase", |v| {
                    v.as_str().is_some_and(|s| s == s.to_uppercase())
                }))
                .validator(Validator::predicate("short", "must be short", |v| {
                    v.as_str().is_some_and(|s| s.len() <= 4)
                })),
        )
        .without_env()
        .build()
        .unwrap();

    let err = registry.update_one("CODE", "toolong").unwrap_err();
    assert!(err.to_string().contains("must be uppercase"), "{err}");
    let err = registry.update_one("CODE", "TOOLONG").unwrap_err();
    assert!(err.to_string().contains("must be short"), "{err}");
}

#[test]
fn test_custom_cross_rule() {
    let registry = SettingsRegistry::builder()
        .with_setting(SettingSchema::int("MIN", 1))
        .with_setting(SettingSchema::int("MAX", 10))
        .with_rule(CrossRule::new("min <= max", |values| {
            let min = values["MIN"].as_i64().unwrap_or_default();
            let max = values["MAX"].as_i64().unwrap_or_default();
            if min <= max {
                Ok(())
            } else {
                Err(format!("MIN ({min}) exceeds MAX ({max})"))
            }
        }))
        .without_env()
        .build()
        .unwrap();

    registry.update_one("MIN", 20).unwrap();
    assert!(registry.last_validation_failure().unwrap().contains("exceeds"));

    registry.update_one("MAX", 30).unwrap();
    assert!(registry.last_validation_failure().is_none());
}

// =============================================================================
// Robustness
// =============================================================================

#[test]
fn test_panicking_observer_does_not_poison_registry() {
    let registry = Arc::new(registry());
    registry
        .add_observer("MODE", |_, _, _| panic!("observer failure"))
        .unwrap();

    let reg = Arc::clone(&registry);
    let result = std::thread::spawn(move || reg.update_one("MODE", "strict")).join();
    assert!(result.is_err());

    // value was committed before the panic and the registry stays usable
    assert_eq!(registry.query("MODE").unwrap(), json!("strict"));
    registry.update_one("RETRY_LIMIT", 2).unwrap();
    assert_eq!(registry.query("RETRY_LIMIT").unwrap(), json!(2));
}
