// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-account unread badge aggregation.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashSet;
use nudge_core::{ConversationStore, ThreadId};
use tracing::{debug, warn};

use crate::accounts::ActiveAccountResolver;

/// Process-lifetime set of threads known to hold unread messages.
///
/// Insert-only and never persisted. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct KnownUnreadThreads {
    inner: Arc<DashSet<ThreadId>>,
}

impl KnownUnreadThreads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the thread was not yet known.
    pub fn insert(&self, thread: ThreadId) -> bool {
        self.inner.insert(thread)
    }

    pub fn contains(&self, thread: &ThreadId) -> bool {
        self.inner.contains(thread)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Point-in-time copy of the set.
    pub fn snapshot(&self) -> HashSet<ThreadId> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}

/// Computes the application badge number.
pub struct UnreadBadgeAggregator {
    known: KnownUnreadThreads,
    conversations: Arc<dyn ConversationStore>,
    accounts: ActiveAccountResolver,
}

impl UnreadBadgeAggregator {
    pub fn new(
        known: KnownUnreadThreads,
        conversations: Arc<dyn ConversationStore>,
        accounts: ActiveAccountResolver,
    ) -> Self {
        Self {
            known,
            conversations,
            accounts,
        }
    }

    /// Number of distinct unread threads.
    ///
    /// Counts the known-unread snapshot, every unread conversation of an active
    /// account, and `current_thread_id`. The shared set is not modified.
    pub async fn compute_badge(&self, current_thread_id: Option<&str>) -> usize {
        let mut threads = self.known.snapshot();
        let known = threads.len();

        let active: HashSet<_> = self.accounts.list_active_accounts().await.into_iter().collect();

        match self.conversations.stream_unread_conversations().await {
            Ok(rows) => {
                threads.extend(
                    rows.iter()
                        .filter(|row| active.contains(&row.account))
                        .map(|row| row.thread_id()),
                );
            }
            Err(e) => warn!(error = %e, "unread conversation query failed"),
        }

        if let Some(current) = current_thread_id {
            threads.insert(ThreadId::from(current));
        }

        debug!(known, active_accounts = active.len(), badge = threads.len(), "badge computed");
        threads.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_core::{AccountRecord, BareJid};
    use nudge_test_utils::{MockConversationStore, MockCredentialStore};
    use proptest::prelude::*;

    fn jid(s: &str) -> BareJid {
        BareJid::parse(s).unwrap()
    }

    fn aggregator(
        known: KnownUnreadThreads,
        conversations: MockConversationStore,
        credentials: MockCredentialStore,
    ) -> UnreadBadgeAggregator {
        UnreadBadgeAggregator::new(
            known,
            Arc::new(conversations),
            ActiveAccountResolver::new(Arc::new(credentials)),
        )
    }

    #[tokio::test]
    async fn inactive_accounts_are_excluded() {
        let credentials = MockCredentialStore::new()
            .with_active_account(jid("a@example.com"), None)
            .with_account(jid("b@example.com"), None, Some(AccountRecord::new(false).encode()));
        let conversations = MockConversationStore::new()
            .with_unread(jid("a@example.com"), jid("x@example.com"))
            .with_unread(jid("a@example.com"), jid("y@example.com"))
            .with_unread(jid("b@example.com"), jid("x@example.com"))
            .with_unread(jid("b@example.com"), jid("y@example.com"))
            .with_unread(jid("b@example.com"), jid("z@example.com"));
        let badge = aggregator(KnownUnreadThreads::new(), conversations, credentials);

        assert_eq!(badge.compute_badge(None).await, 2);
        assert_eq!(
            badge
                .compute_badge(Some("account=a@example.com|sender=x@example.com"))
                .await,
            2
        );
        assert_eq!(
            badge
                .compute_badge(Some("account=a@example.com|sender=new@example.com"))
                .await,
            3
        );
    }

    #[tokio::test]
    async fn known_threads_union_with_rows() {
        let known = KnownUnreadThreads::new();
        known.insert(ThreadId::from("account=a@example.com|sender=x@example.com"));
        known.insert(ThreadId::from("account=gone@example.com|sender=q@example.com"));

        let credentials = MockCredentialStore::new().with_active_account(jid("a@example.com"), None);
        let conversations =
            MockConversationStore::new().with_unread(jid("a@example.com"), jid("x@example.com"));
        let badge = aggregator(known.clone(), conversations, credentials);

        assert_eq!(badge.compute_badge(None).await, 2);
        assert_eq!(known.len(), 2);
    }

    #[tokio::test]
    async fn database_failure_degrades_to_known_set() {
        let known = KnownUnreadThreads::new();
        known.insert(ThreadId::from("account=a@example.com|sender=x@example.com"));
        let credentials = MockCredentialStore::new().with_active_account(jid("a@example.com"), None);
        let badge = aggregator(known, MockConversationStore::new().failing(), credentials);

        assert_eq!(badge.compute_badge(Some("t")).await, 2);
    }

    #[tokio::test]
    async fn compute_is_idempotent_and_does_not_grow_the_set() {
        let known = KnownUnreadThreads::new();
        let credentials = MockCredentialStore::new().with_active_account(jid("a@example.com"), None);
        let conversations =
            MockConversationStore::new().with_unread(jid("a@example.com"), jid("x@example.com"));
        let badge = aggregator(known.clone(), conversations, credentials);

        let first = badge.compute_badge(Some("current")).await;
        let second = badge.compute_badge(Some("current")).await;
        assert_eq!(first, second);
        assert!(known.is_empty());
    }

    proptest! {
        #[test]
        fn duplicate_insert_grows_by_at_most_one(
            existing in proptest::collection::vec("[a-z]{1,6}", 0..20),
            thread in "[a-z]{1,6}",
        ) {
            let known = KnownUnreadThreads::new();
            for t in &existing {
                known.insert(ThreadId(t.clone()));
            }
            let before = known.len();
            known.insert(ThreadId(thread.clone()));
            known.insert(ThreadId(thread.clone()));
            prop_assert!(known.len() <= before + 1);
            prop_assert!(known.contains(&ThreadId(thread)));
        }
    }
}
