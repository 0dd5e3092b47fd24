// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use tracing::debug;

use nudge_config::model::StorageConfig;
use nudge_core::{
    BareJid, Collaborator, ConversationId, ConversationInfo, ConversationStore, HealthStatus,
    NudgeError,
};

use crate::database::{Database, map_tr_err};
use crate::models::MessageState;
use crate::queries;

/// Conversation store backed by the chat application's database.
pub struct SqliteConversationStore {
    db: Database,
    unread_states: Vec<i64>,
}

impl SqliteConversationStore {
    /// Open the database named by `config`, read-only unless configured otherwise.
    pub async fn open(config: &StorageConfig) -> Result<Self, NudgeError> {
        let db = if config.read_only {
            Database::open_read_only(&config.database_path).await?
        } else {
            Database::open(&config.database_path).await?
        };
        debug!(
            path = %config.database_path,
            read_only = config.read_only,
            "conversation store opened"
        );
        Ok(Self::with_database(db, config.unread_states.clone()))
    }

    /// Wrap an already open database.
    pub fn with_database(db: Database, unread_states: Vec<i64>) -> Self {
        Self { db, unread_states }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Collaborator for SqliteConversationStore {
    fn name(&self) -> &str {
        "sqlite-conversations"
    }

    async fn health_check(&self) -> Result<HealthStatus, NudgeError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1 FROM chats LIMIT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        if self.unread_states.is_empty() {
            return Ok(HealthStatus::Degraded(
                "no unread states configured; badge counts only known threads".into(),
            ));
        }
        let unknown: Vec<i64> = self
            .unread_states
            .iter()
            .copied()
            .filter(|code| MessageState::from_code(*code).is_none())
            .collect();
        if !unknown.is_empty() {
            return Ok(HealthStatus::Degraded(format!(
                "unknown message state codes {unknown:?} in unread states"
            )));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn find_conversation_name_and_kind(
        &self,
        account: &BareJid,
        peer: &BareJid,
    ) -> Result<Option<ConversationInfo>, NudgeError> {
        queries::conversations::find_name_and_kind(&self.db, account, peer).await
    }

    async fn stream_unread_conversations(&self) -> Result<Vec<ConversationId>, NudgeError> {
        queries::unread::list_unread_conversations(&self.db, &self.unread_states).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use nudge_core::MessageKind;

    fn config(path: &std::path::Path, read_only: bool) -> StorageConfig {
        StorageConfig {
            database_path: path.to_str().unwrap().to_string(),
            read_only,
            unread_states: vec![2, 6, 7],
        }
    }

    #[tokio::test]
    async fn read_only_store_sees_seeded_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");

        let writer = SqliteConversationStore::open(&config(&path, false)).await.unwrap();
        seed::upsert_roster_item(writer.database(), "alice@example.com", "bob@example.com", Some("Bob"))
            .await
            .unwrap();
        seed::upsert_chat(writer.database(), "alice@example.com", "bob@example.com", 0, None)
            .await
            .unwrap();
        seed::insert_message(
            writer.database(),
            "alice@example.com",
            "bob@example.com",
            Some("bob@example.com"),
            Some("hello"),
            1,
            MessageState::IncomingUnread,
        )
        .await
        .unwrap();
        writer.database().close().await.unwrap();

        let store = SqliteConversationStore::open(&config(&path, true)).await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);

        let account = BareJid::parse("alice@example.com").unwrap();
        let peer = BareJid::parse("bob@example.com").unwrap();
        let info = store
            .find_conversation_name_and_kind(&account, &peer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.kind, MessageKind::Direct);
        assert_eq!(store.stream_unread_conversations().await.unwrap().len(), 1);
        assert!(store.should_show_notification(&account, Some(&peer), Some("hello")).await);
    }

    #[tokio::test]
    async fn missing_database_fails_to_open_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        assert!(SqliteConversationStore::open(&config(&path, true)).await.is_err());
    }

    #[tokio::test]
    async fn empty_unread_states_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        let store = SqliteConversationStore::with_database(db, Vec::new());
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[tokio::test]
    async fn unknown_unread_state_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        let store = SqliteConversationStore::with_database(db, vec![2, 9]);
        match store.health_check().await.unwrap() {
            HealthStatus::Degraded(message) => assert!(message.contains('9')),
            other => panic!("expected degraded, got {other:?}"),
        }
    }
}
