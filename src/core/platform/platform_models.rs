// Platform domain models - posts, channels and users as the host hands them to us.
//
// Field names follow the host's wire format (snake_case JSON) through serde renames,
// while the Rust side uses the names the filter reasons about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property set on every post the plugin itself sends.
pub const SENT_BY_PLUGIN_PROP: &str = "sent_by_plugin";

/// A message instance, either about to be created or about to be updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub channel_id: String,
    /// The author. The host calls this `user_id`.
    #[serde(rename = "user_id", default)]
    pub author_id: String,
    #[serde(rename = "message", default)]
    pub text: String,
    /// Key-value annotations. The host calls these `props`.
    #[serde(rename = "props", default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Post {
    pub fn new(
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            author_id: author_id.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// A post marked as synthesized by this plugin.
    pub fn from_plugin(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut post = Self {
            channel_id: channel_id.into(),
            text: text.into(),
            ..Default::default()
        };
        post.properties
            .insert(SENT_BY_PLUGIN_PROP.to_string(), Value::Bool(true));
        post
    }

    /// Copy of this post with its text replaced.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    #[allow(dead_code)]
    pub fn is_sent_by_plugin(&self) -> bool {
        self.properties
            .get(SENT_BY_PLUGIN_PROP)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    /// URL name of the channel. This is what every filtering rule compares against.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

/// Membership record handed over when somebody leaves (or is removed from) a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMember {
    pub channel_id: String,
    pub user_id: String,
}
