// In-memory platform for tests. Channels and users live in DashMaps; every ephemeral
// notice and created post is recorded so tests can assert on side effects.

use super::platform_api::{PlatformApi, PlatformError};
use super::platform_models::{Channel, Post, User};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MockPlatform {
    channels: DashMap<String, Channel>,
    users: DashMap<String, User>,
    /// (recipient user id, notice)
    pub ephemeral: Mutex<Vec<(String, Post)>>,
    pub created: Mutex<Vec<Post>>,
    fail_user_lookups: AtomicBool,
    fail_ephemeral: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(self, id: &str, name: &str) -> Self {
        self.channels.insert(
            id.to_string(),
            Channel {
                id: id.to_string(),
                name: name.to_string(),
                display_name: name.to_uppercase(),
            },
        );
        self
    }

    pub fn with_user(self, id: &str, username: &str) -> Self {
        self.users.insert(
            id.to_string(),
            User {
                id: id.to_string(),
                username: username.to_string(),
            },
        );
        self
    }

    /// Make every user lookup fail, even for known users.
    pub fn fail_user_lookups(&self) {
        self.fail_user_lookups.store(true, Ordering::SeqCst);
    }

    /// Make every ephemeral notice fail. Nothing is recorded.
    pub fn fail_ephemeral(&self) {
        self.fail_ephemeral.store(true, Ordering::SeqCst);
    }

    pub fn ephemeral_count(&self) -> usize {
        self.ephemeral.lock().len()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }
}

#[async_trait]
impl PlatformApi for MockPlatform {
    async fn get_channel(&self, channel_id: &str) -> Result<Channel, PlatformError> {
        self.channels
            .get(channel_id)
            .map(|c| c.clone())
            .ok_or_else(|| PlatformError::NotFound(format!("channel {}", channel_id)))
    }

    async fn get_user(&self, user_id: &str) -> Result<User, PlatformError> {
        if self.fail_user_lookups.load(Ordering::SeqCst) {
            return Err(PlatformError::Api("user service unavailable".to_string()));
        }
        self.users
            .get(user_id)
            .map(|u| u.clone())
            .ok_or_else(|| PlatformError::NotFound(format!("user {}", user_id)))
    }

    async fn send_ephemeral_post(&self, user_id: &str, post: Post) -> Result<(), PlatformError> {
        if self.fail_ephemeral.load(Ordering::SeqCst) {
            return Err(PlatformError::Api("post service unavailable".to_string()));
        }
        self.ephemeral.lock().push((user_id.to_string(), post));
        Ok(())
    }

    async fn create_post(&self, post: Post) -> Result<Post, PlatformError> {
        let mut stored = post;
        stored.id = format!("post-{}", self.created_count() + 1);
        self.created.lock().push(stored.clone());
        Ok(stored)
    }
}
