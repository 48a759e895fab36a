// The core module contains all business logic.
// Each feature gets its own submodule; none of them know which chat server they run against.

#[path = "platform/mod.rs"]
pub mod platform;

#[path = "filtering/mod.rs"]
pub mod filtering;

#[path = "membership/leave_notifier.rs"]
pub mod membership;
