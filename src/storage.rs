//! File overlay formats
//!
//! Overlay files decode into a flat mapping of setting names to raw values.
//! JSON is always available; YAML and TOML are feature-gated.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Supported overlay file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayFormat {
    /// JSON object
    Json,
    /// YAML mapping
    #[cfg(feature = "yaml")]
    Yaml,
    /// TOML table
    #[cfg(feature = "toml")]
    Toml,
}

impl OverlayFormat {
    /// Pick a format from a file extension (`json`, `yaml`/`yml`, `toml`)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(OverlayFormat::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(OverlayFormat::Yaml),
            #[cfg(feature = "toml")]
            "toml" => Some(OverlayFormat::Toml),
            _ => None,
        }
    }

    /// Canonical file extension for this format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            OverlayFormat::Json => "json",
            #[cfg(feature = "yaml")]
            OverlayFormat::Yaml => "yaml",
            #[cfg(feature = "toml")]
            OverlayFormat::Toml => "toml",
        }
    }

    /// Decode file content into an untyped document
    ///
    /// # Errors
    ///
    /// Returns the decoder's message on malformed input.
    pub fn decode(&self, content: &str) -> std::result::Result<Value, String> {
        match self {
            OverlayFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml")]
            OverlayFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            #[cfg(feature = "toml")]
            OverlayFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Encode a settings mapping
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if the mapping cannot be represented.
    pub fn encode(&self, data: &Map<String, Value>) -> Result<String> {
        match self {
            OverlayFormat::Json => serde_json::to_string_pretty(data).map_err(Error::from),
            #[cfg(feature = "yaml")]
            OverlayFormat::Yaml => {
                serde_yaml::to_string(data).map_err(|e| Error::Serialize(e.to_string()))
            }
            #[cfg(feature = "toml")]
            OverlayFormat::Toml => {
                toml::to_string_pretty(data).map_err(|e| Error::Serialize(e.to_string()))
            }
        }
    }
}

impl std::fmt::Display for OverlayFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Expand a leading `~` to the home directory
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap_or(path));
        }
    }
    path.to_path_buf()
}

/// Read and decode an overlay file.
///
/// Missing files, unreadable files and decode errors are all
/// [`Error::SourceUnavailable`].
pub(crate) fn read_overlay(path: &Path, format: OverlayFormat) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    format
        .decode(&content)
        .map_err(|reason| Error::SourceUnavailable {
            path: path.to_path_buf(),
            reason: format!("invalid {format}: {reason}"),
        })
}

/// Write content atomically: temp file next to the target, then rename.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let file_name = path.file_name().ok_or_else(|| Error::FileWrite {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let mut temp_filename = file_name.to_os_string();
    temp_filename.push(".tmp");
    let temp_path = path.with_file_name(temp_filename);

    std::fs::write(&temp_path, content).map_err(|e| Error::FileWrite {
        path: temp_path.clone(),
        source: e,
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// =============================================================================
// Tests
// =============================================================================
