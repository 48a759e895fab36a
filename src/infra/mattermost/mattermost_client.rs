use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::filtering::{PluginSettings, SettingsError, SettingsSource};
use crate::core::platform::{Channel, PlatformApi, PlatformError, Post, User};

/// Minimal Mattermost REST API (v4) client. It exposes only the calls the plugin needs.
pub struct MattermostClient {
    client: Client,
    base_url: String,
    plugin_id: String,
}

impl MattermostClient {
    pub fn new(base_url: &str, token: &str, plugin_id: &str) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| PlatformError::Api(e.to_string()))?,
        );
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| PlatformError::Api(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            plugin_id: plugin_id.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    /// Turn a non-success response into a PlatformError.
    async fn check(resp: Response, what: &str) -> Result<Response, PlatformError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(what.to_string()));
        }

        let body = resp.text().await.unwrap_or_default();
        Err(PlatformError::Api(format!(
            "Mattermost returned {} for {}: {}",
            status,
            what,
            api_error_message(&body)
        )))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, PlatformError> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| PlatformError::Api(e.to_string()))?;

        Self::check(resp, what)
            .await?
            .json()
            .await
            .map_err(|e| PlatformError::Api(e.to_string()))
    }
}

/// Mattermost error bodies look like `{"id": "...", "message": "..."}`.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Pull this plugin's settings record out of the server configuration document.
fn plugin_settings_from_config(
    config: &Value,
    plugin_id: &str,
) -> Result<PluginSettings, SettingsError> {
    let plugins = &config["PluginSettings"]["Plugins"];
    if plugins.is_null() {
        return Err(SettingsError::Missing(
            "server config has no PluginSettings.Plugins section".to_string(),
        ));
    }

    match plugins.get(plugin_id) {
        Some(section) => Ok(PluginSettings::deserialize(section)?),
        // Plugin never configured in the System Console yet.
        None => Ok(PluginSettings::default()),
    }
}

#[async_trait]
impl PlatformApi for MattermostClient {
    async fn get_channel(&self, channel_id: &str) -> Result<Channel, PlatformError> {
        self.get_json(
            &format!("/channels/{}", channel_id),
            &format!("channel {}", channel_id),
        )
        .await
    }

    async fn get_user(&self, user_id: &str) -> Result<User, PlatformError> {
        self.get_json(&format!("/users/{}", user_id), &format!("user {}", user_id))
            .await
    }

    async fn send_ephemeral_post(&self, user_id: &str, post: Post) -> Result<(), PlatformError> {
        let payload = json!({
            "user_id": user_id,
            "post": post,
        });

        let resp = self
            .client
            .post(self.url("/posts/ephemeral"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PlatformError::Api(e.to_string()))?;

        Self::check(resp, "ephemeral post").await?;
        Ok(())
    }

    async fn create_post(&self, post: Post) -> Result<Post, PlatformError> {
        let resp = self
            .client
            .post(self.url("/posts"))
            .json(&post)
            .send()
            .await
            .map_err(|e| PlatformError::Api(e.to_string()))?;

        Self::check(resp, "post")
            .await?
            .json()
            .await
            .map_err(|e| PlatformError::Api(e.to_string()))
    }
}

#[async_trait]
impl SettingsSource for MattermostClient {
    async fn load_settings(&self) -> Result<PluginSettings, SettingsError> {
        let config: Value = self.get_json("/config", "server config").await?;
        plugin_settings_from_config(&config, &self.plugin_id)
    }
}
