// Basic usage example for axiom-settings
//
// Run with: cargo run --example basic_usage
// Try:      RETRY_LIMIT=5 FEATURE_FLAGS="beta, dark-mode" cargo run --example basic_usage

use axiom_settings::{SettingSchema, SettingsRegistry, SettingsSchema};
use serde_json::json;

// Define your settings schema
struct AppSettings;

impl SettingsSchema for AppSettings {
    fn settings() -> Vec<SettingSchema> {
        vec![
            SettingSchema::string("APP_NAME", "My App").description("The name of your application"),
            SettingSchema::int("RETRY_LIMIT", 3)
                .range(0, 10)
                .description("How many times a request is retried"),
            SettingSchema::list("FEATURE_FLAGS", &[]).description("Enabled feature flags"),
            SettingSchema::bool("DEBUG", false).description("Enable debug output"),
        ]
    }
}

fn main() -> axiom_settings::Result<()> {
    env_logger::init();

    // Defaults, then the process environment
    let registry = SettingsRegistry::builder()
        .with_schema::<AppSettings>()
        .build_shared()?;

    println!("Current settings:\n{registry}\n");

    registry.add_global_observer(|_, name, value| {
        println!("  changed: {name} = {value}");
    });

    println!("Updating RETRY_LIMIT and DEBUG...");
    registry.update_one("RETRY_LIMIT", 5)?;
    registry.update_one("DEBUG", "yes")?;

    println!("Setting RETRY_LIMIT to the same value (no notification)...");
    registry.update_one("RETRY_LIMIT", "5")?;

    println!("Applying a batch...");
    registry.update_many(&json!({"APP_NAME": "Demo", "FEATURE_FLAGS": ["beta"]}))?;

    let flags: Vec<String> = registry.get("FEATURE_FLAGS")?;
    println!("\nFeature flags: {flags:?}");

    match registry.update_one("RETRY_LIMIT", 99) {
        Ok(_) => println!("unexpectedly accepted"),
        Err(e) => println!("Rejected: {e}"),
    }

    println!("\nExported:\n{}", serde_json::to_string_pretty(&registry.to_value())?);

    registry.reset_all()?;
    println!("\nAfter reset:\n{registry}");
    Ok(())
}
