use super::SettingsRegistry;
use crate::error::{Error, Result};
use crate::parse::json_kind;
use crate::storage::{self, OverlayFormat};

use log::{info, warn};
use serde_json::Value;
use std::path::Path;

impl SettingsRegistry {
    /// Apply a file overlay.
    ///
    /// The file must decode to a flat mapping of setting names to values.
    /// It is then applied exactly like [`update_many`](Self::update_many):
    /// all entries are validated first and nothing changes if any is rejected.
    /// A leading `~` in `path` is expanded to the home directory.
    ///
    /// Returns the number of settings that changed.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceUnavailable`] if the file is missing, unreadable or
    ///   malformed
    /// - [`Error::InvalidOverlayShape`] if it does not decode to a mapping
    /// - any rejection from [`update_many`](Self::update_many)
    pub fn load_from_file(&self, path: impl AsRef<Path>, format: OverlayFormat) -> Result<usize> {
        let path = storage::expand_home(path.as_ref());
        let document = storage::read_overlay(&path, format).inspect_err(|e| {
            warn!("Could not load settings overlay: {e}");
        })?;

        if !document.is_object() {
            return Err(Error::InvalidOverlayShape(json_kind(&document).to_string()));
        }

        let changed = self.update_many(&document)?;
        info!(
            "Loaded settings overlay {} ({changed} setting(s) changed)",
            path.display()
        );
        Ok(changed)
    }

    /// Apply a file overlay, picking the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] for unrecognized extensions, plus
    /// everything [`load_from_file`](Self::load_from_file) returns.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let format = OverlayFormat::from_path(path).ok_or_else(|| Error::SourceUnavailable {
            path: path.to_path_buf(),
            reason: "unrecognized file extension".to_string(),
        })?;
        self.load_from_file(path, format)
    }

    /// Write all current values to a file.
    ///
    /// The output is written atomically and can be loaded back with
    /// [`load_from_file`](Self::load_from_file) without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] or [`Error::FileWrite`].
    pub fn export_to_file(&self, path: impl AsRef<Path>, format: OverlayFormat) -> Result<()> {
        let path = storage::expand_home(path.as_ref());
        let content = format.encode(&self.export_all())?;
        storage::write_atomic(&path, &content)?;
        info!("Exported {} settings to {}", self.len(), path.display());
        Ok(())
    }

    /// All current values as a single document
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.export_all())
    }
}
