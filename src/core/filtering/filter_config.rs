// Filter configuration - the host's flat settings record, the parsed immutable snapshot,
// and the store that swaps snapshots on reload.
//
// Readers take an `Arc<FilterConfig>` and keep it for as long as they need; a reload
// installs a fresh Arc and never touches a published snapshot.

use crate::core::platform::PlatformError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings missing: {0}")]
    Missing(String),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

// ============================================================================
// RAW SETTINGS
// ============================================================================

/// The plugin settings record exactly as the host supplies it: plain strings.
///
/// The server stores plugin settings keys lowercased, so both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginSettings {
    /// Name of the single moderated channel.
    #[serde(alias = "channel")]
    pub channel: String,
    /// Space separated usernames allowed to post in the gated channels.
    #[serde(alias = "allowedusers")]
    pub allowed_users: String,
    /// Space separated channel names where header-update messages are suppressed.
    #[serde(alias = "channelnoupdate")]
    pub channel_no_update: String,
}

/// Where the settings record comes from.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn load_settings(&self) -> Result<PluginSettings, SettingsError>;
}

// ============================================================================
// PARSED SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    /// `None` when the setting is blank, so it can never match a real channel.
    pub moderated_channel: Option<String>,
    pub allowed_users: HashSet<String>,
    pub no_update_channels: HashSet<String>,
}

impl FilterConfig {
    pub fn from_settings(settings: &PluginSettings) -> Self {
        let channel = settings.channel.trim();
        Self {
            moderated_channel: (!channel.is_empty()).then(|| channel.to_string()),
            allowed_users: parse_name_list(&settings.allowed_users),
            no_update_channels: parse_name_list(&settings.channel_no_update),
        }
    }

    pub fn is_moderated_channel(&self, channel_name: &str) -> bool {
        self.moderated_channel.as_deref() == Some(channel_name)
    }

    pub fn is_allowed_user(&self, username: &str) -> bool {
        self.allowed_users.contains(username)
    }

    pub fn is_no_update_channel(&self, channel_name: &str) -> bool {
        self.no_update_channels.contains(channel_name)
    }
}

/// Split a whitespace separated list. Empty segments are dropped.
fn parse_name_list(raw: &str) -> HashSet<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

// ============================================================================
// SNAPSHOT STORE
// ============================================================================

/// Holds the active configuration snapshot.
#[derive(Default)]
pub struct ConfigStore {
    current: RwLock<Arc<FilterConfig>>,
}

impl ConfigStore {
    pub fn new(initial: FilterConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The active snapshot. Stays valid after a later `replace`.
    pub fn snapshot(&self) -> Arc<FilterConfig> {
        Arc::clone(&*self.current.read())
    }

    /// Install a new snapshot.
    ///
    /// The write lock is held only for the pointer swap. Never call into the platform
    /// or the filter while holding it: a host callback re-entering the plugin would
    /// deadlock on the read side.
    pub fn replace(&self, next: FilterConfig) {
        let next = Arc::new(next);
        let previous = {
            let mut current = self.current.write();
            std::mem::replace(&mut *current, next)
        };
        drop(previous);
    }
}
