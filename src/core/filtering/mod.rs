// Core filtering module - decides what happens to posts before the host stores them.

pub mod filter_config;
pub mod filter_rules;
pub mod filter_service;

pub use filter_config::{ConfigStore, FilterConfig, PluginSettings, SettingsError, SettingsSource};
pub use filter_service::{Decision, PostFilter};
