// Hooks layer - the host-facing side: event shapes and the plugin that dispatches them.

pub mod hook_events;
pub mod plugin;

pub use hook_events::{HookReply, HookRequest, HookResponse};
pub use plugin::PostFilterPlugin;
