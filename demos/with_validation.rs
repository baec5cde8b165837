// Validation and observers example for axiom-settings
//
// Run with: cargo run --example with_validation

use axiom_settings::{
    DocsConfig, LogConfig, LoggingSettings, OverlayFormat, SettingSchema, SettingsRegistry,
    Validator, generate_docs, sync_max_level,
};
use serde_json::{Value, json};

fn main() -> axiom_settings::Result<()> {
    env_logger::init();

    let registry = SettingsRegistry::builder()
        .with_schema::<LoggingSettings>()
        .with_setting(
            SettingSchema::string("SERVICE_EMAIL", "ops@example.com")
                .pattern(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
                .description("Contact address for alerts"),
        )
        .with_setting(
            SettingSchema::string("SERVICE_NAME", "axiom")
                .validator(Validator::new("slug", |_, value| {
                    let slug = value
                        .as_str()
                        .unwrap_or_default()
                        .trim()
                        .to_lowercase()
                        .replace(' ', "-");
                    Ok(Value::String(slug))
                }))
                .non_empty(),
        )
        .with_env_prefix("AXIOM")
        .build()?;

    sync_max_level(&registry)?;

    // A logging facade rebuilds its outputs when any LOG_* setting changes
    registry.add_global_observer(|registry, name, _| {
        if name.starts_with("LOG_") {
            if let Ok(config) = LogConfig::from_registry(registry) {
                println!(
                    "  rebuild outputs: console={} file={} gcp={}",
                    config.console_enabled(),
                    config.to_file,
                    config.gcp_enabled
                );
            }
        }
    });

    println!("=== Validation ===");
    for (name, value) in [
        ("SERVICE_EMAIL", json!("not-an-email")),
        ("LOG_STD_LEVEL", json!("chatty")),
        ("LOG_BATCH_SIZE", json!(-1)),
    ] {
        match registry.update_one(name, value) {
            Ok(_) => println!("{name}: accepted"),
            Err(e) => println!("{name}: {e}"),
        }
    }

    registry.update_one("SERVICE_NAME", "  Billing Worker ")?;
    println!("SERVICE_NAME normalized to {}", registry.query("SERVICE_NAME")?);

    println!("\n=== Cross-setting rule ===");
    registry.update_one("LOG_GCP_ENABLED", true)?;
    if let Some(failure) = registry.last_validation_failure() {
        println!("reported: {failure}");
    }
    registry.update_one("LOG_GCP_PROJECT", "billing-prod")?;
    println!("after fix: {:?}", registry.last_validation_failure());

    println!("\n=== Export ===");
    let path = std::env::temp_dir().join("axiom-settings-demo.json");
    registry.export_to_file(&path, OverlayFormat::Json)?;
    println!("wrote {}", path.display());

    println!("\n{}", generate_docs(&registry, DocsConfig::new().with_title("Demo Settings")));
    Ok(())
}
