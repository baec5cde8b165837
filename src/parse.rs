//! Raw string to typed value parsers
//!
//! Environment variables (and string values found in file overlays) arrive as
//! untyped text. Each declared [`SettingType`] has exactly one parser here.

use crate::config::SettingType;
use crate::error::{Error, Result};
use serde_json::Value;

const TRUE_WORDS: [&str; 5] = ["true", "1", "t", "y", "yes"];
const FALSE_WORDS: [&str; 5] = ["false", "0", "f", "n", "no"];

/// Parse a boolean flag (case-insensitive).
///
/// Accepts `true, 1, t, y, yes` and `false, 0, f, n, no`.
///
/// # Errors
///
/// Returns a reason string for any other input.
pub fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    let lowered = raw.to_ascii_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(format!(
            "expected one of {} or {}",
            TRUE_WORDS.join("/"),
            FALSE_WORDS.join("/")
        ))
    }
}

/// Parse a base-10 integer.
///
/// # Errors
///
/// Returns the underlying `ParseIntError` message.
pub fn parse_int(raw: &str) -> std::result::Result<i64, String> {
    raw.trim().parse::<i64>().map_err(|e| e.to_string())
}

/// Parse a JSON object.
///
/// # Errors
///
/// Returns the syntax error (with line and column) for malformed JSON, or a
/// reason if the document is valid JSON but not an object.
pub fn parse_object(raw: &str) -> std::result::Result<Value, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        format!(
            "invalid JSON at line {} column {}: {e}",
            e.line(),
            e.column()
        )
    })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(format!("expected a JSON object, got {}", json_kind(&value)))
    }
}

/// Split a comma-delimited list, trimming each element.
///
/// Empty (or all-whitespace) input yields an empty list.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

/// Parse `raw` according to the declared type of setting `key`.
///
/// # Errors
///
/// Returns [`Error::Parse`] describing the input and the expected type.
pub fn parse_value(key: &str, setting_type: SettingType, raw: &str) -> Result<Value> {
    let parsed = match setting_type {
        SettingType::Bool => parse_bool(raw).map(Value::Bool),
        SettingType::Int => parse_int(raw).map(Value::from),
        SettingType::Object => parse_object(raw),
        SettingType::List => Ok(Value::from(parse_list(raw))),
        SettingType::String => Ok(Value::String(raw.to_string())),
    };

    parsed.map_err(|reason| Error::Parse {
        key: key.to_string(),
        expected: setting_type.to_string(),
        input: raw.to_string(),
        reason,
    })
}

/// Short human name for the JSON kind of a value
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
