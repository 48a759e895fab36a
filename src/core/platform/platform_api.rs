// The host platform port. Every call the plugin makes back into the chat server goes
// through this trait, so the filtering logic can be driven entirely offline in tests.

use super::platform_models::{Channel, Post, User};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Platform API error: {0}")]
    Api(String),
}

// ============================================================================
// PORT
// ============================================================================

/// Calls into the host messaging platform.
///
/// Lookups are awaited until they complete or fail; timeouts belong to the host's
/// own call contract, not to this trait.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Fetch a channel by ID.
    async fn get_channel(&self, channel_id: &str) -> Result<Channel, PlatformError>;

    /// Fetch a user by ID.
    async fn get_user(&self, user_id: &str) -> Result<User, PlatformError>;

    /// Show `post` to `user_id` only. Nothing is persisted in the channel.
    async fn send_ephemeral_post(&self, user_id: &str, post: Post) -> Result<(), PlatformError>;

    /// Publish a post in a channel. Returns the post as stored by the host.
    async fn create_post(&self, post: Post) -> Result<Post, PlatformError>;
}
