// Filtering rules - the ordered list of special cases a post is checked against.
//
// Each rule is a predicate over (channel, post, config). The service walks RULE_ORDER and
// the first rule whose predicate holds decides the post. Later rules assume the earlier
// ones did not match, so the order is part of the contract.

use super::filter_config::FilterConfig;
use crate::core::platform::{Channel, Post};

/// Marker text of the system message the host posts when a channel header changes.
pub const HEADER_UPDATE_MARKER: &str = "updated the channel header";

/// Channel where only lowercase letters, digits and spaces survive.
pub const LOWERCASE_CHANNEL: &str = "ssm";
/// Channel where only uppercase letters, digits, `!` and spaces survive.
pub const UPPERCASE_CHANNEL: &str = "ssm-v0";
/// Internal channel of the board.
pub const BOARD_CHANNEL: &str = "bestuur-intern";

/// Prefix a non-board member uses to post in the board channel anyway.
pub const OVERRIDE_PREFIX: &str = "!";

pub const NO_UPDATES_REASON: &str = "You are not allowed to post message updates in this channel";
pub const STRIPPED_EMPTY_REASON: &str = "NO";
pub const BOARD_ONLY_REASON: &str = "This is the internal channel of the board, so only the board can post in it. If you think it's appropriate, override by starting your message with '!'";
pub const NOT_ALLOWED_REASON: &str = "You are not allowed to post in this channel";

// ============================================================================
// TEXT MODES
// ============================================================================

/// Character whitelist enforced by one of the text-mode channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// a-z, 0-9 and space.
    Lowercase,
    /// A-Z, 0-9, `!` and space.
    Uppercase,
}

impl TextMode {
    pub fn allows(self, c: char) -> bool {
        match self {
            TextMode::Lowercase => c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ',
            TextMode::Uppercase => {
                c.is_ascii_uppercase() || c.is_ascii_digit() || c == '!' || c == ' '
            }
        }
    }

    /// Remove every character outside the whitelist.
    pub fn strip(self, text: &str) -> String {
        text.chars().filter(|c| self.allows(*c)).collect()
    }
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    /// Header-change announcements in a no-update channel.
    NoUpdateSuppression,
    /// Lowercase-only channel.
    LowercaseMode,
    /// Uppercase-with-exclamation channel.
    UppercaseMode,
    /// Board-only channel with the `!` override.
    BoardGate,
    /// The configured moderated channel.
    ModeratedChannelGate,
}

/// Evaluation order. A post matching none of these is allowed unchanged.
pub const RULE_ORDER: [FilterRule; 5] = [
    FilterRule::NoUpdateSuppression,
    FilterRule::LowercaseMode,
    FilterRule::UppercaseMode,
    FilterRule::BoardGate,
    FilterRule::ModeratedChannelGate,
];

impl FilterRule {
    pub fn matches(self, channel: &Channel, post: &Post, config: &FilterConfig) -> bool {
        match self {
            FilterRule::NoUpdateSuppression => {
                post.text.contains(HEADER_UPDATE_MARKER)
                    && config.is_no_update_channel(&channel.name)
            }
            FilterRule::LowercaseMode => channel.name == LOWERCASE_CHANNEL,
            FilterRule::UppercaseMode => channel.name == UPPERCASE_CHANNEL,
            FilterRule::BoardGate => channel.name == BOARD_CHANNEL,
            FilterRule::ModeratedChannelGate => config.is_moderated_channel(&channel.name),
        }
    }

    /// First rule in RULE_ORDER that matches, if any.
    pub fn first_match(channel: &Channel, post: &Post, config: &FilterConfig) -> Option<Self> {
        RULE_ORDER
            .into_iter()
            .find(|rule| rule.matches(channel, post, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filtering::filter_config::PluginSettings;

    fn channel(name: &str) -> Channel {
        Channel {
            id: format!("id-{}", name),
            name: name.to_string(),
            display_name: String::new(),
        }
    }

    fn config() -> FilterConfig {
        FilterConfig::from_settings(&PluginSettings {
            channel: "announcements".to_string(),
            allowed_users: "alice".to_string(),
            channel_no_update: "ssm general".to_string(),
        })
    }

    #[test]
    fn test_lowercase_strip() {
        assert_eq!(TextMode::Lowercase.strip("ALL CAPS! 123"), "  123");
        assert_eq!(TextMode::Lowercase.strip("hello, world!"), "hello world");
        assert_eq!(TextMode::Lowercase.strip("!!!"), "");
    }

    #[test]
    fn test_uppercase_strip() {
        assert_eq!(TextMode::Uppercase.strip("ALL CAPS! 123"), "ALL CAPS! 123");
        assert_eq!(TextMode::Uppercase.strip("Hello World!"), "H W!");
        assert_eq!(TextMode::Uppercase.strip("quiet."), "");
    }

    #[test]
    fn test_strip_drops_non_ascii() {
        assert_eq!(TextMode::Lowercase.strip("café über 9"), "caf ber 9");
        assert_eq!(TextMode::Uppercase.strip("ÉCOLE\tOK"), "COLEOK");
    }

    #[test]
    fn test_strip_is_idempotent() {
        for input in ["Mixed Case, 42!", "ALL CAPS! 123", "", "émoji 🎉 text"] {
            for mode in [TextMode::Lowercase, TextMode::Uppercase] {
                let once = mode.strip(input);
                assert_eq!(mode.strip(&once), once, "{:?} on {:?}", mode, input);
            }
        }
    }

    #[test]
    fn test_header_update_rule_needs_both_marker_and_listed_channel() {
        let config = config();
        let header = Post::new("c", "u", "@bob updated the channel header to: hi");
        let plain = Post::new("c", "u", "hello");

        assert!(FilterRule::NoUpdateSuppression.matches(&channel("general"), &header, &config));
        assert!(!FilterRule::NoUpdateSuppression.matches(&channel("random"), &header, &config));
        assert!(!FilterRule::NoUpdateSuppression.matches(&channel("general"), &plain, &config));
    }

    #[test]
    fn test_header_update_takes_precedence_over_text_mode() {
        let header = Post::new("c", "u", "updated the channel header");

        let rule = FilterRule::first_match(&channel("ssm"), &header, &config());

        assert_eq!(rule, Some(FilterRule::NoUpdateSuppression));
    }

    #[test]
    fn test_first_match_per_channel() {
        let config = config();
        let post = Post::new("c", "u", "hi");

        assert_eq!(
            FilterRule::first_match(&channel("ssm"), &post, &config),
            Some(FilterRule::LowercaseMode)
        );
        assert_eq!(
            FilterRule::first_match(&channel("ssm-v0"), &post, &config),
            Some(FilterRule::UppercaseMode)
        );
        assert_eq!(
            FilterRule::first_match(&channel("bestuur-intern"), &post, &config),
            Some(FilterRule::BoardGate)
        );
        assert_eq!(
            FilterRule::first_match(&channel("announcements"), &post, &config),
            Some(FilterRule::ModeratedChannelGate)
        );
        assert_eq!(FilterRule::first_match(&channel("random"), &post, &config), None);
    }
}
