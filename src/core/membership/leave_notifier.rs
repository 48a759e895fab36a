// Leave notifier - announces in a channel when somebody was removed from it by someone else.
// Leaving on your own is not a kick and stays quiet.

use crate::core::platform::{ChannelMember, PlatformApi, Post, User};
use std::sync::Arc;

pub fn kick_message(username: &str) -> String {
    format!("[BOT] I just kicked @{} from the channel", username)
}

pub struct LeaveNotifier<P: PlatformApi> {
    platform: Arc<P>,
}

impl<P: PlatformApi> LeaveNotifier<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    /// Handle a member leaving a channel.
    ///
    /// Returns the announcement as stored by the host, or `None` when nothing was posted.
    pub async fn user_left(&self, member: &ChannelMember, actor: Option<&User>) -> Option<Post> {
        let actor = actor?;
        if actor.id == member.user_id {
            return None;
        }

        let kicked = match self.platform.get_user(&member.user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(user_id = %member.user_id, error = %e, "Failed to find user");
                return None;
            }
        };

        let announcement = Post::new(
            member.channel_id.clone(),
            actor.id.clone(),
            kick_message(&kicked.username),
        );

        match self.platform.create_post(announcement).await {
            Ok(post) => {
                tracing::info!(
                    channel_id = %member.channel_id,
                    actor = %actor.username,
                    kicked = %kicked.username,
                    "Announced kick"
                );
                Some(post)
            }
            Err(e) => {
                tracing::warn!(channel_id = %member.channel_id, "Failed to post kick notice: {}", e);
                None
            }
        }
    }
}
