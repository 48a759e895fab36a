// This is the entry point of the post filter plugin process.
//
// **Architecture Overview:**
// - `core/` = Filtering business logic and the platform port (host-agnostic)
// - `infra/` = Implementations of core traits (Mattermost REST API, settings file)
// - `hooks/` = Host-facing adapter (hook events, the plugin object)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Read hook events from stdin and answer each one on stdout

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "hooks/hooks_layer.rs"]
mod hooks;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::filtering::SettingsSource;
use crate::core::platform::PlatformApi;
use crate::hooks::{HookReply, HookRequest, HookResponse, PostFilterPlugin};
use crate::infra::mattermost::MattermostClient;
use crate::infra::settings::JsonSettingsFile;
use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

const DEFAULT_PLUGIN_ID: &str = "nl.post-filter";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries hook responses, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let server_url = std::env::var("MATTERMOST_URL")
        .context("Missing MATTERMOST_URL environment variable")?;
    let token = std::env::var("MATTERMOST_TOKEN")
        .context("Missing MATTERMOST_TOKEN environment variable")?;
    let plugin_id =
        std::env::var("POST_FILTER_PLUGIN_ID").unwrap_or_else(|_| DEFAULT_PLUGIN_ID.to_string());

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let platform = Arc::new(
        MattermostClient::new(&server_url, &token, &plugin_id)
            .context("Failed to create Mattermost client")?,
    );

    let settings: Arc<dyn SettingsSource> = match std::env::var("POST_FILTER_SETTINGS_FILE") {
        Ok(path) => {
            tracing::info!("Reading plugin settings from {}", path);
            Arc::new(JsonSettingsFile::new(path))
        }
        Err(_) => platform.clone(),
    };

    let plugin = Arc::new(PostFilterPlugin::new(platform, settings));

    // Start with a loaded configuration; the host can trigger reloads later.
    if let Err(e) = plugin.on_activate().await {
        tracing::warn!("Starting without configuration: {}", e);
    }

    tracing::info!(plugin_id = %plugin_id, "Post filter ready");
    run_hook_loop(plugin, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Read hook requests line by line and handle each one on its own task.
///
/// Responses go through a single writer task so lines never interleave. The loop ends
/// at end of input once every in-flight event has been answered.
async fn run_hook_loop<P, R, W>(
    plugin: Arc<PostFilterPlugin<P>>,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    P: PlatformApi + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<HookReply>();

    let writer = tokio::spawn(async move {
        while let Some(reply) = rx.recv().await {
            let mut line = serde_json::to_vec(&reply)?;
            line.push(b'\n');
            output.write_all(&line).await?;
            output.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request: HookRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Malformed hook event: {}", e);
                let id = serde_json::from_str::<serde_json::Value>(&line)
                    .ok()
                    .and_then(|v| v["id"].as_u64())
                    .unwrap_or(0);
                let reply = HookReply {
                    id,
                    response: HookResponse::Error {
                        message: format!("malformed hook event: {}", e),
                    },
                };
                if tx.send(reply).is_err() {
                    tracing::warn!(id, "Response writer stopped before reply was sent");
                }
                continue;
            }
        };

        let plugin = Arc::clone(&plugin);
        let tx = tx.clone();
        tokio::spawn(async move {
            let id = request.id;
            let hook = request.event.name();
            tracing::debug!(id, hook, "Handling hook event");

            let response = plugin.handle(request.event).await;
            if tx.send(HookReply { id, response }).is_err() {
                tracing::warn!(id, hook, "Response writer stopped before reply was sent");
            }
        });
    }

    // Writer exits once the last in-flight task drops its sender.
    drop(tx);
    writer.await.context("Response writer panicked")??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::mock_platform::MockPlatform;
    use serde_json::Value;
    use tokio::io::AsyncReadExt;

    /// Run the loop over `input` and collect every reply line.
    async fn replies_for(input: &str) -> Vec<Value> {
        let platform = Arc::new(MockPlatform::new().with_channel("c-random", "random"));
        let dir = tempfile::tempdir().unwrap();
        let settings = Arc::new(JsonSettingsFile::new(dir.path().join("settings.json")));
        let plugin = Arc::new(PostFilterPlugin::new(platform, settings));

        let (output, mut received) = tokio::io::duplex(64 * 1024);
        run_hook_loop(plugin, input.as_bytes(), output).await.unwrap();

        let mut text = String::new();
        received.read_to_string(&mut text).await.unwrap();
        text.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_malformed_line_is_answered_with_id_zero() {
        let replies = replies_for("this is not json\n").await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 0);
        assert_eq!(replies[0]["response"]["result"], "error");
        assert!(replies[0]["response"]["message"]
            .as_str()
            .unwrap()
            .starts_with("malformed hook event"));
    }

    #[tokio::test]
    async fn test_unknown_hook_keeps_request_id() {
        let replies = replies_for(r#"{"id": 7, "event": {"hook": "on_deactivate"}}"#).await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 7);
        assert_eq!(replies[0]["response"]["result"], "error");
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let input = "\n   \n{\"id\": 1, \"event\": {\"hook\": \"on_activate\"}}\n\n";

        let replies = replies_for(input).await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[0]["response"]["result"], "ok");
    }

    #[tokio::test]
    async fn test_every_event_is_answered_before_the_loop_ends() {
        let input: String = (1..=20)
            .map(|id| {
                format!(
                    r#"{{"id": {}, "event": {{"hook": "message_will_be_posted", "post": {{"channel_id": "c-random", "user_id": "u-{}", "message": "hi"}}}}}}"#,
                    id, id
                ) + "\n"
            })
            .collect();

        let replies = replies_for(&input).await;

        let mut ids: Vec<u64> = replies.iter().filter_map(|r| r["id"].as_u64()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
        assert!(replies
            .iter()
            .all(|r| r["response"]["result"] == "allow"));
    }
}
