//! Documentation generator for declared settings
//!
//! Renders a markdown reference of every setting in a registry: type, default,
//! description, validators and (optionally) the current value.

use crate::config::SettingType;
use crate::registry::SettingsRegistry;
use crate::sync::RwLockExt;
use serde_json::Value;
use std::fmt::Write;

/// Configuration for docs generation
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Title for the documentation
    pub title: Option<String>,
    /// Description/introduction text
    pub description: Option<String>,
    /// Whether to show current values next to defaults
    pub show_values: bool,
    /// Whether to group settings by name prefix (`LOG_TO_FILE` -> "Log")
    pub group_by_prefix: bool,
}

impl DocsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            show_values: true,
            group_by_prefix: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    #[must_use]
    pub fn hide_values(mut self) -> Self {
        self.show_values = false;
        self
    }

    #[must_use]
    pub fn flat(mut self) -> Self {
        self.group_by_prefix = false;
        self
    }
}

struct Entry {
    name: String,
    setting_type: SettingType,
    default: Value,
    current: Value,
    description: String,
    validators: Vec<String>,
}

/// Generate markdown documentation for every setting in a registry
#[must_use]
pub fn generate_docs(registry: &SettingsRegistry, config: DocsConfig) -> String {
    let entries: Vec<Entry> = {
        let state = registry.state.read_recovered();
        state
            .settings
            .iter()
            .map(|setting| {
                let schema = setting.schema();
                Entry {
                    name: schema.name.clone(),
                    setting_type: schema.setting_type,
                    default: schema.default.clone(),
                    current: setting.get().clone(),
                    description: schema.description.clone(),
                    validators: schema
                        .validators
                        .iter()
                        .map(|v| v.name().to_string())
                        .collect(),
                }
            })
            .collect()
    };

    let mut output = String::new();

    let title = config
        .title
        .unwrap_or_else(|| "Settings Reference".to_string());
    let _ = writeln!(output, "# {title}\n");

    if let Some(desc) = config.description {
        let _ = writeln!(output, "{desc}\n");
    }

    if config.group_by_prefix {
        let mut sorted: Vec<&Entry> = entries.iter().collect();
        // Stable sort keeps declaration order within a group
        sorted.sort_by_key(|entry| prefix(&entry.name));

        let mut current_group: Option<String> = None;
        for entry in sorted {
            let group = prefix(&entry.name);
            if current_group.as_deref() != Some(group.as_str()) {
                let _ = writeln!(output, "\n## {}\n", capitalize(&group));
                current_group = Some(group);
            }
            format_setting(&mut output, entry, config.show_values);
        }
    } else {
        output.push_str("## Settings\n\n");
        for entry in &entries {
            format_setting(&mut output, entry, config.show_values);
        }
    }

    output
}

fn format_setting(out: &mut String, entry: &Entry, show_values: bool) {
    let _ = writeln!(out, "### `{}`\n", entry.name);

    if show_values && entry.current != entry.default {
        out.push_str("Overridden\n\n");
    }

    if !entry.description.is_empty() {
        let _ = writeln!(out, "{}\n", entry.description);
    }

    out.push_str("| Property | Value |\n");
    out.push_str("|----------|-------|\n");
    let _ = writeln!(out, "| **Type** | {} |", format_type(entry.setting_type));
    let _ = writeln!(out, "| **Default** | `{}` |", entry.default);
    if show_values {
        let _ = writeln!(out, "| **Current** | `{}` |", entry.current);
    }
    if !entry.validators.is_empty() {
        let _ = writeln!(out, "| **Validators** | {} |", entry.validators.join(", "));
    }

    out.push('\n');
    out.push_str("---\n\n");
}

fn format_type(t: SettingType) -> &'static str {
    match t {
        SettingType::Bool => "Boolean",
        SettingType::Int => "Integer",
        SettingType::String => "String",
        SettingType::Object => "Object (JSON)",
        SettingType::List => "List (comma-separated strings)",
    }
}

fn prefix(name: &str) -> String {
    name.split('_').next().unwrap_or(name).to_lowercase()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// =============================================================================
// Tests
// =============================================================================
