// Hook events - the wire shapes the host sends us and the answers we send back.
//
// One JSON object per line in each direction. Requests carry an id so responses to
// concurrently handled events can be matched up by the host.

use crate::core::filtering::Decision;
use crate::core::platform::{ChannelMember, Post, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookEvent {
    OnActivate,
    OnConfigurationChange,
    MessageWillBePosted {
        post: Post,
    },
    MessageWillBeUpdated {
        new_post: Post,
        #[serde(default)]
        old_post: Option<Post>,
    },
    UserHasLeftChannel {
        channel_member: ChannelMember,
        #[serde(default)]
        actor: Option<User>,
    },
}

impl HookEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HookEvent::OnActivate => "on_activate",
            HookEvent::OnConfigurationChange => "on_configuration_change",
            HookEvent::MessageWillBePosted { .. } => "message_will_be_posted",
            HookEvent::MessageWillBeUpdated { .. } => "message_will_be_updated",
            HookEvent::UserHasLeftChannel { .. } => "user_has_left_channel",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HookRequest {
    pub id: u64,
    pub event: HookEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum HookResponse {
    Ok,
    Error { message: String },
    Allow { post: Post },
    Modified { post: Post },
    Rejected { reason: String },
    Notified { post: Option<Post> },
}

impl From<Decision> for HookResponse {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow(post) => HookResponse::Allow { post },
            Decision::AllowModified(post) => HookResponse::Modified { post },
            Decision::Reject { reason } => HookResponse::Rejected { reason },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HookReply {
    pub id: u64,
    pub response: HookResponse,
}
