// The infra module contains implementations of core traits.
// Each implementation goes in its own submodule.

#[path = "mattermost/mod.rs"]
pub mod mattermost;

#[path = "settings/mod.rs"]
pub mod settings;
