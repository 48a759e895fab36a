use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::filtering::{PluginSettings, SettingsError, SettingsSource};

/// Plugin settings read from a local JSON file instead of the server config.
///
/// The file is re-read on every load so a configuration-change event picks up edits.
/// A missing file means "not configured" and yields empty settings.
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SettingsSource for JsonSettingsFile {
    async fn load_settings(&self) -> Result<PluginSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(PluginSettings::default());
        }

        let text = fs::read_to_string(&self.path).await?;
        let settings: PluginSettings = serde_json::from_str(&text)?;
        Ok(settings)
    }
}
