// Platform module - the entities the chat host owns and the calls we make back into it.
// Nothing in here knows which host we run against; infra/ provides the real client.

pub mod platform_api;
pub mod platform_models;

#[cfg(test)]
pub mod mock_platform;

pub use platform_api::{PlatformApi, PlatformError};
pub use platform_models::*;
