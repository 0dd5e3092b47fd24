// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-push pipeline with a delivery deadline.
//!
//! Each push runs decrypt, decode, content building and badge aggregation as
//! a sequence of fallible steps. Whatever happens, the content handler is
//! invoked exactly once: with the finished content, with the best attempt
//! when a step fails, the deadline elapses or the host cancels, or with the
//! raw request content if the invocation is torn down before either.

use std::sync::Arc;
use std::time::Duration;

use nudge_config::model::{ExtensionConfig, NudgeConfig};
use nudge_core::types::keys;
use nudge_core::{
    BareJid, ConversationStore, CredentialStore, MessageKind, NotificationContent, PushRequest,
};
use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::accounts::ActiveAccountResolver;
use crate::badge::{KnownUnreadThreads, UnreadBadgeAggregator};
use crate::codec::PayloadCodec;
use crate::content::{MessageDetails, NotificationContentBuilder};
use crate::decryptor::{EncryptedPush, PushDecryptor};

/// One-shot content handler supplied by the host.
pub type ContentHandler = Box<dyn FnOnce(NotificationContent) + Send + 'static>;

/// Why the best attempt was delivered instead of built content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No parseable `account` in the push metadata.
    MissingAccount,
    Decrypt,
    Decode,
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Content was built and delivered with a badge.
    Built,
    /// The filter hook declined the message; silent content was delivered.
    Suppressed,
    /// A step failed and the best attempt was delivered.
    BestAttempt(FallbackReason),
    /// The deadline elapsed first.
    TimedOut,
    /// The host signalled expiry first.
    Cancelled,
}

/// Settings the pipeline needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub deadline: Duration,
    pub category: String,
}

impl From<&ExtensionConfig> for ServiceSettings {
    fn from(config: &ExtensionConfig) -> Self {
        Self {
            deadline: Duration::from_millis(config.deadline_ms),
            category: config.category.clone(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from(&ExtensionConfig::default())
    }
}

/// Holds the host's handler until it is called. Never calls it twice.
struct Completion {
    handler: Mutex<Option<ContentHandler>>,
    /// Raw request content, delivered if the invocation is dropped undelivered.
    original: NotificationContent,
}

impl Completion {
    fn new(handler: ContentHandler, original: NotificationContent) -> Self {
        Self {
            handler: Mutex::new(Some(handler)),
            original,
        }
    }

    async fn deliver(&self, content: NotificationContent) -> bool {
        let handler = self.handler.lock().await.take();
        match handler {
            Some(handler) => {
                handler(content);
                true
            }
            None => false,
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.get_mut().take() {
            warn!("invocation dropped before delivery; delivering original content");
            handler(std::mem::take(&mut self.original));
        }
    }
}

/// The current best content. Starts as the request copy with sound and
/// category applied and is replaced once the message content is built.
struct BestAttempt {
    content: Mutex<NotificationContent>,
}

impl BestAttempt {
    fn new(request: &NotificationContent, category: &str) -> Self {
        let mut content = request.clone();
        content.sound = true;
        content.category = Some(category.to_string());
        Self {
            content: Mutex::new(content),
        }
    }

    async fn snapshot(&self) -> NotificationContent {
        self.content.lock().await.clone()
    }

    async fn replace(&self, content: NotificationContent) {
        *self.content.lock().await = content;
    }
}

/// The delivered content and how the invocation ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub content: NotificationContent,
    pub outcome: Outcome,
}

/// Notification service extension core.
pub struct NotificationService {
    conversations: Arc<dyn ConversationStore>,
    known: KnownUnreadThreads,
    decryptor: PushDecryptor,
    builder: NotificationContentBuilder,
    badge: UnreadBadgeAggregator,
    deadline: Duration,
}

impl NotificationService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        conversations: Arc<dyn ConversationStore>,
        known: KnownUnreadThreads,
        settings: ServiceSettings,
    ) -> Self {
        let decryptor = PushDecryptor::new(Arc::clone(&credentials));
        let builder = NotificationContentBuilder::new(Arc::clone(&conversations), settings.category);
        let badge = UnreadBadgeAggregator::new(
            known.clone(),
            Arc::clone(&conversations),
            ActiveAccountResolver::new(credentials),
        );
        Self {
            conversations,
            known,
            decryptor,
            builder,
            badge,
            deadline: settings.deadline,
        }
    }

    pub fn from_config(
        config: &NudgeConfig,
        credentials: Arc<dyn CredentialStore>,
        conversations: Arc<dyn ConversationStore>,
        known: KnownUnreadThreads,
    ) -> Self {
        Self::new(
            credentials,
            conversations,
            known,
            ServiceSettings::from(&config.extension),
        )
    }

    pub fn badge(&self) -> &UnreadBadgeAggregator {
        &self.badge
    }

    /// Handle one push. `handler` is invoked exactly once.
    pub async fn did_receive(&self, request: PushRequest, handler: ContentHandler) -> Outcome {
        self.did_receive_with_cancel(request, handler, CancellationToken::new())
            .await
    }

    /// Handle one push, delivering the best attempt early if `expiry` fires.
    pub async fn did_receive_with_cancel(
        &self,
        request: PushRequest,
        handler: ContentHandler,
        expiry: CancellationToken,
    ) -> Outcome {
        let best = BestAttempt::new(&request.content, self.builder.category());
        let completion = Completion::new(handler, request.content);
        debug!(identifier = %request.identifier, "push received");

        tokio::select! {
            (content, outcome) = self.run(&best) => {
                completion.deliver(content).await;
                info!(identifier = %request.identifier, ?outcome, "push processed");
                outcome
            }
            _ = tokio::time::sleep(self.deadline) => {
                warn!(identifier = %request.identifier, deadline = ?self.deadline, "deadline elapsed; delivering best attempt");
                completion.deliver(best.snapshot().await).await;
                Outcome::TimedOut
            }
            _ = expiry.cancelled() => {
                warn!(identifier = %request.identifier, "host expiry; delivering best attempt");
                completion.deliver(best.snapshot().await).await;
                Outcome::Cancelled
            }
        }
    }

    /// Handle one push and return what was delivered.
    pub async fn process(&self, request: PushRequest) -> Processed {
        let original = request.content.clone();
        let (tx, rx) = oneshot::channel();
        let handler: ContentHandler = Box::new(move |content| {
            let _ = tx.send(content);
        });
        let outcome = self.did_receive(request, handler).await;
        let content = rx.await.unwrap_or(original);
        Processed { content, outcome }
    }

    async fn run(&self, best: &BestAttempt) -> (NotificationContent, Outcome) {
        let draft = best.snapshot().await;

        let account = match draft.user_info_str(keys::ACCOUNT).map(BareJid::parse) {
            Some(Ok(account)) => account,
            Some(Err(e)) => {
                warn!(error = %e, "push names an invalid account");
                return (draft, Outcome::BestAttempt(FallbackReason::MissingAccount));
            }
            None => {
                debug!("push without account");
                return (draft, Outcome::BestAttempt(FallbackReason::MissingAccount));
            }
        };

        let encrypted = match (
            draft.user_info_str(keys::ENCRYPTED),
            draft.user_info_str(keys::IV),
        ) {
            (Some(encrypted), Some(iv)) => Some(EncryptedPush {
                encrypted: encrypted.to_string(),
                iv: iv.to_string(),
            }),
            _ => None,
        };

        let details = match encrypted {
            Some(push) => {
                let plaintext = match self.decryptor.decrypt_push(&account, &push).await {
                    Ok(plaintext) => plaintext,
                    Err(e) => {
                        warn!(%account, error = %e, "push decryption failed");
                        return (draft, Outcome::BestAttempt(FallbackReason::Decrypt));
                    }
                };
                let payload = match PayloadCodec::decode(&plaintext) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(%account, error = %e, "push payload decoding failed");
                        return (draft, Outcome::BestAttempt(FallbackReason::Decode));
                    }
                };
                MessageDetails {
                    account,
                    sender: Some(payload.sender),
                    kind: payload.kind,
                    nickname: payload.nickname,
                    body: Some(payload.message),
                }
            }
            None => plain_details(account, &draft),
        };

        let built = self.builder.build(&details).await;
        let mut content = draft;
        built.apply_to(&mut content);
        best.replace(content.clone()).await;

        let show = self
            .conversations
            .should_show_notification(
                &details.account,
                details.sender.as_ref(),
                details.body.as_deref(),
            )
            .await;
        if !show {
            content.title.clear();
            content.body.clear();
            content.sound = false;
            best.replace(content.clone()).await;
            content.badge = Some(self.badge.compute_badge(None).await);
            debug!(account = %details.account, "notification suppressed by filter");
            return (content, Outcome::Suppressed);
        }

        let thread = content.thread_id.clone();
        content.badge = Some(self.badge.compute_badge(thread.as_deref()).await);
        if let Some(thread) = built.thread_id {
            self.known.insert(thread);
        }
        (content, Outcome::Built)
    }
}

/// Message details from the unencrypted metadata fields.
fn plain_details(account: BareJid, draft: &NotificationContent) -> MessageDetails {
    let sender = draft.user_info_str(keys::SENDER).and_then(|raw| match BareJid::parse(raw) {
        Ok(jid) => Some(jid),
        Err(e) => {
            warn!(error = %e, "plain push names an invalid sender");
            None
        }
    });
    let body = draft.user_info_str(keys::BODY).map(str::to_string);
    let nickname = draft.user_info_str(keys::NICKNAME).map(str::to_string);
    let unread_hint = draft.user_info_i64(keys::UNREAD_MESSAGES);
    debug!(
        %account,
        sender = sender.as_ref().map(BareJid::as_str),
        body_len = body.as_ref().map(String::len),
        unread_hint,
        "plain push"
    );

    MessageDetails {
        account,
        sender,
        kind: MessageKind::Unknown,
        nickname,
        body,
    }
}
