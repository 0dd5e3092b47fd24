// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Title, body and category policy for chat-message notifications.

use std::sync::Arc;

use nudge_core::types::keys;
use nudge_core::{
    BareJid, ConversationId, ConversationStore, MessageKind, NotificationContent, ThreadId,
};
use tracing::{debug, warn};

/// What is known about the message a push announces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDetails {
    pub account: BareJid,
    /// Absent on plain pushes that did not name a (valid) sender.
    pub sender: Option<BareJid>,
    pub kind: MessageKind,
    pub nickname: Option<String>,
    pub body: Option<String>,
}

/// Result of [`NotificationContentBuilder::build`].
///
/// `None` fields leave the corresponding part of the draft untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltNotification {
    pub account: BareJid,
    pub sender: Option<BareJid>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: String,
    pub thread_id: Option<ThreadId>,
}

impl BuiltNotification {
    /// Write the built fields into `content`.
    ///
    /// The request metadata is replaced by the `account` and `sender`
    /// correlation keys so the host can route taps back to the conversation.
    pub fn apply_to(&self, content: &mut NotificationContent) {
        if let Some(title) = &self.title {
            content.title = title.clone();
        }
        if let Some(body) = &self.body {
            content.body = body.clone();
        }
        content.category = Some(self.category.clone());
        content.sound = true;
        content.thread_id = self.thread_id.as_ref().map(|t| t.to_string());

        content.user_info.clear();
        content
            .user_info
            .insert(keys::ACCOUNT.to_string(), self.account.to_string().into());
        if let Some(sender) = &self.sender {
            content
                .user_info
                .insert(keys::SENDER.to_string(), sender.to_string().into());
        }
    }
}

/// Title for a message given the resolved conversation name and kind.
pub fn compose_title(
    kind: MessageKind,
    sender: &BareJid,
    name: Option<&str>,
    nickname: Option<&str>,
) -> String {
    let display = name.unwrap_or(sender.as_str());
    match (kind, nickname) {
        (MessageKind::GroupChat, Some(nickname)) => {
            format!("{nickname} mentioned you in {display}")
        }
        _ => display.to_string(),
    }
}

/// Builds notification content, consulting the conversation store for names.
pub struct NotificationContentBuilder {
    conversations: Arc<dyn ConversationStore>,
    category: String,
}

impl NotificationContentBuilder {
    pub fn new(conversations: Arc<dyn ConversationStore>, category: impl Into<String>) -> Self {
        Self {
            conversations,
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Resolve the conversation and compose the notification fields.
    ///
    /// The stored kind wins over the kind the payload claims. A failed or
    /// empty lookup falls back to the payload kind and the bare sender.
    pub async fn build(&self, details: &MessageDetails) -> BuiltNotification {
        let Some(sender) = &details.sender else {
            return BuiltNotification {
                account: details.account.clone(),
                sender: None,
                title: None,
                body: details.body.clone(),
                category: self.category.clone(),
                thread_id: None,
            };
        };

        let (name, kind) = match self
            .conversations
            .find_conversation_name_and_kind(&details.account, sender)
            .await
        {
            Ok(Some(info)) => (info.name, info.kind),
            Ok(None) => (None, details.kind),
            Err(e) => {
                warn!(account = %details.account, %sender, error = %e, "conversation lookup failed");
                (None, details.kind)
            }
        };

        let title = compose_title(kind, sender, name.as_deref(), details.nickname.as_deref());
        let thread_id = ConversationId::new(details.account.clone(), sender.clone()).thread_id();
        debug!(account = %details.account, %sender, %kind, named = name.is_some(), "notification content built");

        BuiltNotification {
            account: details.account.clone(),
            sender: Some(sender.clone()),
            title: Some(title),
            body: details.body.clone(),
            category: self.category.clone(),
            thread_id: Some(thread_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_core::ConversationInfo;
    use nudge_test_utils::MockConversationStore;

    fn jid(s: &str) -> BareJid {
        BareJid::parse(s).unwrap()
    }

    fn details(sender: &str, kind: MessageKind, nickname: Option<&str>) -> MessageDetails {
        MessageDetails {
            account: jid("alice@example.com"),
            sender: Some(jid(sender)),
            kind,
            nickname: nickname.map(str::to_string),
            body: Some("hi".to_string()),
        }
    }

    fn builder(store: MockConversationStore) -> NotificationContentBuilder {
        NotificationContentBuilder::new(Arc::new(store), "MESSAGE")
    }

    #[test]
    fn title_policy() {
        let bob = jid("bob@example.com");
        let room = jid("room@conference.example.com");
        assert_eq!(compose_title(MessageKind::Direct, &bob, Some("Bob"), None), "Bob");
        assert_eq!(compose_title(MessageKind::Direct, &bob, None, Some("ignored")), "bob@example.com");
        assert_eq!(
            compose_title(MessageKind::GroupChat, &room, None, Some("Bob")),
            "Bob mentioned you in room@conference.example.com"
        );
        assert_eq!(
            compose_title(MessageKind::GroupChat, &room, Some("Team"), Some("Bob")),
            "Bob mentioned you in Team"
        );
        assert_eq!(compose_title(MessageKind::GroupChat, &room, Some("Team"), None), "Team");
        assert_eq!(compose_title(MessageKind::Unknown, &bob, None, Some("Bob")), "bob@example.com");
    }

    #[tokio::test]
    async fn direct_with_stored_name() {
        let store = MockConversationStore::new().with_conversation(
            jid("alice@example.com"),
            jid("bob@example.com"),
            ConversationInfo { name: Some("Bob".into()), kind: MessageKind::Direct },
        );
        let built = builder(store)
            .build(&details("bob@example.com", MessageKind::Direct, None))
            .await;
        assert_eq!(built.title.as_deref(), Some("Bob"));
        assert_eq!(built.body.as_deref(), Some("hi"));
        assert_eq!(built.category, "MESSAGE");
        assert_eq!(
            built.thread_id.unwrap().as_str(),
            "account=alice@example.com|sender=bob@example.com"
        );
    }

    #[tokio::test]
    async fn stored_kind_wins_over_payload_kind() {
        let store = MockConversationStore::new().with_conversation(
            jid("alice@example.com"),
            jid("room@conference.example.com"),
            ConversationInfo { name: Some("Team".into()), kind: MessageKind::GroupChat },
        );
        let built = builder(store)
            .build(&details("room@conference.example.com", MessageKind::Direct, Some("Bob")))
            .await;
        assert_eq!(built.title.as_deref(), Some("Bob mentioned you in Team"));
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_payload_kind() {
        let store = MockConversationStore::new().failing();
        let built = builder(store)
            .build(&details("room@conference.example.com", MessageKind::GroupChat, Some("Bob")))
            .await;
        assert_eq!(
            built.title.as_deref(),
            Some("Bob mentioned you in room@conference.example.com")
        );
    }

    #[tokio::test]
    async fn missing_sender_leaves_title_alone() {
        let built = builder(MockConversationStore::new())
            .build(&MessageDetails {
                account: jid("alice@example.com"),
                sender: None,
                kind: MessageKind::Unknown,
                nickname: None,
                body: Some("hey".into()),
            })
            .await;
        assert_eq!(built.title, None);
        assert_eq!(built.thread_id, None);

        let mut content = NotificationContent {
            title: "New message".into(),
            ..Default::default()
        };
        built.apply_to(&mut content);
        assert_eq!(content.title, "New message");
        assert_eq!(content.body, "hey");
        assert_eq!(content.user_info_str("account"), Some("alice@example.com"));
        assert_eq!(content.user_info_str("sender"), None);
    }

    #[tokio::test]
    async fn apply_replaces_metadata_and_sets_sound() {
        let built = builder(MockConversationStore::new())
            .build(&details("bob@example.com", MessageKind::Direct, None))
            .await;
        let mut content = NotificationContent::default();
        content
            .user_info
            .insert("encrypted".into(), serde_json::json!("AAAA"));
        built.apply_to(&mut content);

        assert!(content.sound);
        assert_eq!(content.category.as_deref(), Some("MESSAGE"));
        assert_eq!(content.user_info.len(), 2);
        assert_eq!(content.user_info_str("sender"), Some("bob@example.com"));
        assert_eq!(
            content.thread_id.as_deref(),
            Some("account=alice@example.com|sender=bob@example.com")
        );
    }
}
