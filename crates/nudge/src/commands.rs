// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `process`, `badge`, `accounts` and `config` subcommands.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use nudge_config::NudgeConfig;
use nudge_core::{NotificationContent, NudgeError, PushRequest};
use nudge_service::{ActiveAccountResolver, ContentHandler, KnownUnreadThreads, NotificationService};
use nudge_storage::SqliteConversationStore;
use nudge_vault::SqliteCredentialStore;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Parse a push request.
///
/// Accepts either a full request (`{"identifier": ..., "content": {...}}`) or
/// a bare push metadata map, which becomes the request's `user_info`.
pub fn parse_request(raw: &str) -> Result<PushRequest, NudgeError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| NudgeError::Decode(format!("push request is not JSON: {e}")))?;

    match value {
        serde_json::Value::Object(map) if map.contains_key("content") => {
            serde_json::from_value(serde_json::Value::Object(map))
                .map_err(|e| NudgeError::Decode(format!("invalid push request: {e}")))
        }
        serde_json::Value::Object(map) => Ok(PushRequest {
            identifier: String::new(),
            content: NotificationContent {
                user_info: map.into_iter().collect(),
                ..Default::default()
            },
        }),
        _ => Err(NudgeError::Decode("push request must be a JSON object".into())),
    }
}

fn read_input(input: Option<&Path>) -> Result<String, NudgeError> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| NudgeError::Internal(format!("cannot read {}: {e}", path.display()))),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| NudgeError::Internal(format!("cannot read stdin: {e}")))?;
            Ok(raw)
        }
    }
}

async fn open_credentials(config: &NudgeConfig) -> Result<Arc<SqliteCredentialStore>, NudgeError> {
    Ok(Arc::new(SqliteCredentialStore::open_read_only(&config.vault).await?))
}

async fn open_service(config: &NudgeConfig) -> Result<NotificationService, NudgeError> {
    let credentials = open_credentials(config).await?;
    let conversations = Arc::new(SqliteConversationStore::open(&config.storage).await?);
    Ok(NotificationService::from_config(
        config,
        credentials,
        conversations,
        KnownUnreadThreads::new(),
    ))
}

/// Cancelled on SIGINT, so an interrupted run still delivers its best attempt.
fn expiry_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted; delivering best attempt");
            trigger.cancel();
        }
    });
    token
}

pub async fn process(config: &NudgeConfig, input: Option<&Path>, pretty: bool) -> Result<(), NudgeError> {
    let request = parse_request(&read_input(input)?)?;
    let original = request.content.clone();
    let service = open_service(config).await?;

    let (tx, rx) = oneshot::channel();
    let handler: ContentHandler = Box::new(move |content| {
        let _ = tx.send(content);
    });
    let outcome = service
        .did_receive_with_cancel(request, handler, expiry_token())
        .await;
    let content = rx.await.unwrap_or(original);
    debug!(?outcome, "process finished");

    let rendered = if pretty {
        serde_json::to_string_pretty(&content)
    } else {
        serde_json::to_string(&content)
    }
    .map_err(|e| NudgeError::Internal(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

pub async fn badge(config: &NudgeConfig, thread: Option<&str>) -> Result<(), NudgeError> {
    let service = open_service(config).await?;
    println!("{}", service.badge().compute_badge(thread).await);
    Ok(())
}

pub async fn accounts(config: &NudgeConfig) -> Result<(), NudgeError> {
    let resolver = ActiveAccountResolver::new(open_credentials(config).await?);
    for account in resolver.list_active_accounts().await {
        println!("{account}");
    }
    Ok(())
}

pub fn print_config(config: &NudgeConfig) -> Result<(), NudgeError> {
    let rendered =
        toml::to_string_pretty(config).map_err(|e| NudgeError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}
