// Post filter service - decides whether a post may be created or updated.
//
// This service handles:
// - Resolving the post's channel (and its author when a gate needs it)
// - Walking the ordered rules in filter_rules
// - Sending the author-only notice when a gate rejects a post
//
// Lookup failures never escape: they are logged and the post is dropped silently,
// because a post whose channel or author cannot be resolved cannot be vetted.

use super::filter_config::FilterConfig;
use super::filter_rules::{
    FilterRule, TextMode, BOARD_ONLY_REASON, NOT_ALLOWED_REASON, NO_UPDATES_REASON,
    OVERRIDE_PREFIX, STRIPPED_EMPTY_REASON,
};
use crate::core::platform::{PlatformApi, Post, User};
use std::sync::Arc;

// ============================================================================
// DECISION
// ============================================================================

/// Outcome of filtering one post.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Let the post through untouched.
    Allow(Post),
    /// Let the post through with rewritten text.
    AllowModified(Post),
    /// Block the post. An empty reason means a silent drop.
    Reject { reason: String },
}

impl Decision {
    pub fn reject(reason: impl Into<String>) -> Self {
        Decision::Reject {
            reason: reason.into(),
        }
    }

    /// Block without telling the author why.
    pub fn silent_reject() -> Self {
        Decision::Reject {
            reason: String::new(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Reject { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Decision::Reject { reason } => Some(reason),
            _ => None,
        }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct PostFilter<P: PlatformApi> {
    platform: Arc<P>,
}

impl<P: PlatformApi> PostFilter<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    /// Decide what happens to `post` under the given configuration snapshot.
    pub async fn decide(&self, post: &Post, config: &FilterConfig) -> Decision {
        let channel = match self.platform.get_channel(&post.channel_id).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::error!(
                    channel_id = %post.channel_id,
                    error = %e,
                    "Failed to find channel in post"
                );
                return Decision::silent_reject();
            }
        };

        let Some(rule) = FilterRule::first_match(&channel, post, config) else {
            return Decision::Allow(post.clone());
        };

        tracing::debug!(channel = %channel.name, rule = ?rule, "Filter rule matched");

        match rule {
            FilterRule::NoUpdateSuppression => Decision::reject(NO_UPDATES_REASON),
            FilterRule::LowercaseMode => Self::apply_text_mode(post, TextMode::Lowercase),
            FilterRule::UppercaseMode => Self::apply_text_mode(post, TextMode::Uppercase),
            FilterRule::BoardGate => self.board_gate(post, config).await,
            FilterRule::ModeratedChannelGate => self.moderated_channel_gate(post, config).await,
        }
    }

    fn apply_text_mode(post: &Post, mode: TextMode) -> Decision {
        let stripped = mode.strip(&post.text);
        if stripped.is_empty() {
            return Decision::reject(STRIPPED_EMPTY_REASON);
        }
        Decision::AllowModified(post.with_text(stripped))
    }

    /// Board members post freely; anyone else needs the override prefix.
    async fn board_gate(&self, post: &Post, config: &FilterConfig) -> Decision {
        let Some(author) = self.resolve_author(post).await else {
            return Decision::silent_reject();
        };

        if config.is_allowed_user(&author.username) || post.text.starts_with(OVERRIDE_PREFIX) {
            return Decision::Allow(post.clone());
        }

        self.notify_author(post, BOARD_ONLY_REASON).await;
        Decision::reject(BOARD_ONLY_REASON)
    }

    /// Only allowed users may post in the moderated channel.
    async fn moderated_channel_gate(&self, post: &Post, config: &FilterConfig) -> Decision {
        let Some(author) = self.resolve_author(post).await else {
            return Decision::silent_reject();
        };

        if config.is_allowed_user(&author.username) {
            return Decision::Allow(post.clone());
        }

        self.notify_author(post, NOT_ALLOWED_REASON).await;
        Decision::reject(NOT_ALLOWED_REASON)
    }

    async fn resolve_author(&self, post: &Post) -> Option<User> {
        match self.platform.get_user(&post.author_id).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::error!(
                    user_id = %post.author_id,
                    error = %e,
                    "Failed to find user in post"
                );
                None
            }
        }
    }

    /// Fire-and-forget notice visible to the author only.
    async fn notify_author(&self, post: &Post, text: &str) {
        let notice = Post::from_plugin(post.channel_id.clone(), text);
        if let Err(e) = self
            .platform
            .send_ephemeral_post(&post.author_id, notice)
            .await
        {
            tracing::warn!(user_id = %post.author_id, "Failed to send ephemeral notice: {}", e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
