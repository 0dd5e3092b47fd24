// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the chat and roster database.

use async_trait::async_trait;

use crate::error::NudgeError;
use crate::jid::BareJid;
use crate::traits::collaborator::Collaborator;
use crate::types::{ConversationId, ConversationInfo};

/// Queries the extension runs against the chat application's database.
#[async_trait]
pub trait ConversationStore: Collaborator {
    /// Display name and stored kind of the conversation between `account` and `peer`.
    ///
    /// When the peer is both a roster contact and a joined room, the room wins.
    async fn find_conversation_name_and_kind(
        &self,
        account: &BareJid,
        peer: &BareJid,
    ) -> Result<Option<ConversationInfo>, NudgeError>;

    /// Every conversation, across all accounts, with at least one message in an
    /// unread-eligible state. Each conversation appears at most once.
    async fn stream_unread_conversations(&self) -> Result<Vec<ConversationId>, NudgeError>;

    /// Whether a notification should be shown at all for this message.
    async fn should_show_notification(
        &self,
        _account: &BareJid,
        _sender: Option<&BareJid>,
        _body: Option<&str>,
    ) -> bool {
        true
    }
}
