// The plugin object - what the host talks to.
//
// This layer is THIN: it owns the configuration snapshot store, hands snapshots to the
// core services and translates their results into hook responses.

use super::hook_events::{HookEvent, HookResponse};
use crate::core::filtering::{
    ConfigStore, Decision, FilterConfig, PostFilter, SettingsError, SettingsSource,
};
use crate::core::membership::LeaveNotifier;
use crate::core::platform::{ChannelMember, PlatformApi, Post, User};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to load plugin configuration: {0}")]
    Configuration(#[from] SettingsError),
}

pub struct PostFilterPlugin<P: PlatformApi> {
    config: ConfigStore,
    settings: Arc<dyn SettingsSource>,
    /// Serializes reloads so a slow load can never overwrite a newer one.
    reload: Mutex<()>,
    filter: PostFilter<P>,
    leave_notifier: LeaveNotifier<P>,
}

impl<P: PlatformApi> PostFilterPlugin<P> {
    pub fn new(platform: Arc<P>, settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            config: ConfigStore::new(FilterConfig::default()),
            settings,
            reload: Mutex::new(()),
            filter: PostFilter::new(Arc::clone(&platform)),
            leave_notifier: LeaveNotifier::new(platform),
        }
    }

    /// Current configuration snapshot.
    #[cfg(test)]
    pub fn configuration(&self) -> Arc<FilterConfig> {
        self.config.snapshot()
    }

    pub async fn on_activate(&self) -> Result<(), PluginError> {
        self.on_configuration_change().await
    }

    /// Reload settings and install them as the new snapshot.
    ///
    /// On failure the previous snapshot stays active.
    pub async fn on_configuration_change(&self) -> Result<(), PluginError> {
        // Held across load and replace. The store's write lock is only taken for the swap,
        // so readers never wait on the host.
        let _reload = self.reload.lock().await;
        let settings = self.settings.load_settings().await?;
        let config = FilterConfig::from_settings(&settings);

        tracing::info!(
            moderated_channel = ?config.moderated_channel,
            allowed_users = config.allowed_users.len(),
            no_update_channels = config.no_update_channels.len(),
            "Configuration loaded"
        );

        self.config.replace(config);
        Ok(())
    }

    pub async fn message_will_be_posted(&self, post: &Post) -> Decision {
        let config = self.config.snapshot();
        let decision = self.filter.decide(post, &config).await;
        Self::log_decision(post, &decision);
        decision
    }

    pub async fn message_will_be_updated(
        &self,
        new_post: &Post,
        _old_post: Option<&Post>,
    ) -> Decision {
        let config = self.config.snapshot();
        let decision = self.filter.decide(new_post, &config).await;
        Self::log_decision(new_post, &decision);
        decision
    }

    pub async fn user_has_left_channel(
        &self,
        member: &ChannelMember,
        actor: Option<&User>,
    ) -> Option<Post> {
        self.leave_notifier.user_left(member, actor).await
    }

    /// Dispatch one hook event.
    pub async fn handle(&self, event: HookEvent) -> HookResponse {
        match event {
            HookEvent::OnActivate => Self::status(self.on_activate().await),
            HookEvent::OnConfigurationChange => Self::status(self.on_configuration_change().await),
            HookEvent::MessageWillBePosted { post } => {
                self.message_will_be_posted(&post).await.into()
            }
            HookEvent::MessageWillBeUpdated { new_post, old_post } => self
                .message_will_be_updated(&new_post, old_post.as_ref())
                .await
                .into(),
            HookEvent::UserHasLeftChannel {
                channel_member,
                actor,
            } => HookResponse::Notified {
                post: self
                    .user_has_left_channel(&channel_member, actor.as_ref())
                    .await,
            },
        }
    }

    fn log_decision(post: &Post, decision: &Decision) {
        tracing::debug!(
            channel_id = %post.channel_id,
            user_id = %post.author_id,
            allowed = decision.is_allowed(),
            reason = decision.reason().unwrap_or_default(),
            "Filtered post"
        );
    }

    fn status(result: Result<(), PluginError>) -> HookResponse {
        match result {
            Ok(()) => HookResponse::Ok,
            Err(e) => {
                tracing::error!("{}", e);
                HookResponse::Error {
                    message: e.to_string(),
                }
            }
        }
    }
}
