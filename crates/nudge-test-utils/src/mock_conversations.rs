// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use nudge_core::{
    BareJid, Collaborator, ConversationId, ConversationInfo, ConversationStore, HealthStatus,
    NudgeError,
};

/// A conversation store for tests, with optional latency and failure injection.
pub struct MockConversationStore {
    conversations: HashMap<(BareJid, BareJid), ConversationInfo>,
    unread: Vec<ConversationId>,
    failing: bool,
    delay: Option<Duration>,
    unread_delay: Option<Duration>,
    filter_delay: Option<Duration>,
    show: bool,
    lookups: AtomicUsize,
}

impl Default for MockConversationStore {
    fn default() -> Self {
        Self {
            conversations: HashMap::new(),
            unread: Vec::new(),
            failing: false,
            delay: None,
            unread_delay: None,
            filter_delay: None,
            show: true,
            lookups: AtomicUsize::new(0),
        }
    }
}

impl MockConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversation(mut self, account: BareJid, peer: BareJid, info: ConversationInfo) -> Self {
        self.conversations.insert((account, peer), info);
        self
    }

    /// Add one unread row. Duplicates are kept, as a join would produce them.
    pub fn with_unread(mut self, account: BareJid, peer: BareJid) -> Self {
        self.unread.push(ConversationId::new(account, peer));
        self
    }

    /// Make every query fail with a lookup error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Sleep before answering each query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before answering the unread query only.
    pub fn with_unread_delay(mut self, delay: Duration) -> Self {
        self.unread_delay = Some(delay);
        self
    }

    /// Sleep inside the filter hook.
    pub fn with_filter_delay(mut self, delay: Duration) -> Self {
        self.filter_delay = Some(delay);
        self
    }

    /// Have the filter hook decline every message.
    pub fn suppressing(mut self) -> Self {
        self.show = false;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    async fn pause_and_check(&self) -> Result<(), NudgeError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(NudgeError::lookup("chat database unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl Collaborator for MockConversationStore {
    fn name(&self) -> &str {
        "mock-conversations"
    }

    async fn health_check(&self) -> Result<HealthStatus, NudgeError> {
        if self.failing {
            return Ok(HealthStatus::Unhealthy("configured to fail".into()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ConversationStore for MockConversationStore {
    async fn find_conversation_name_and_kind(
        &self,
        account: &BareJid,
        peer: &BareJid,
    ) -> Result<Option<ConversationInfo>, NudgeError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.pause_and_check().await?;
        Ok(self
            .conversations
            .get(&(account.clone(), peer.clone()))
            .cloned())
    }

    async fn stream_unread_conversations(&self) -> Result<Vec<ConversationId>, NudgeError> {
        if let Some(delay) = self.unread_delay {
            tokio::time::sleep(delay).await;
        }
        self.pause_and_check().await?;
        Ok(self.unread.clone())
    }

    async fn should_show_notification(
        &self,
        _account: &BareJid,
        _sender: Option<&BareJid>,
        _body: Option<&str>,
    ) -> bool {
        if let Some(delay) = self.filter_delay {
            tokio::time::sleep(delay).await;
        }
        self.show
    }
}
