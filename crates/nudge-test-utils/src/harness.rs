// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` wires a [`NotificationService`] to the mock collaborators and
//! captures every delivered content. `SqliteFixture` does the same with the
//! real SQLite stores in a temp directory.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use nudge_config::model::{NudgeConfig, StorageConfig, VaultConfig};
use nudge_core::types::keys;
use nudge_core::{AccountRecord, BareJid, NotificationContent, NudgeError, PushKey, PushRequest};
use nudge_service::{
    ContentHandler, KnownUnreadThreads, NotificationService, Outcome, Payload, PayloadCodec,
    ServiceSettings, encrypt_push,
};
use nudge_storage::{Database, SqliteConversationStore};
use nudge_vault::SqliteCredentialStore;

use crate::mock_conversations::MockConversationStore;
use crate::mock_credentials::MockCredentialStore;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    credentials: MockCredentialStore,
    conversations: MockConversationStore,
    known: KnownUnreadThreads,
    settings: ServiceSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            credentials: MockCredentialStore::new(),
            conversations: MockConversationStore::new(),
            known: KnownUnreadThreads::new(),
            settings: ServiceSettings::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: MockCredentialStore) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_conversations(mut self, conversations: MockConversationStore) -> Self {
        self.conversations = conversations;
        self
    }

    /// Share an existing known-unread set, e.g. across two harnesses.
    pub fn with_known_unread(mut self, known: KnownUnreadThreads) -> Self {
        self.known = known;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.settings.deadline = deadline;
        self
    }

    pub fn build(self) -> TestHarness {
        let credentials = Arc::new(self.credentials);
        let conversations = Arc::new(self.conversations);
        let service = NotificationService::new(
            credentials.clone(),
            conversations.clone(),
            self.known.clone(),
            self.settings,
        );
        TestHarness {
            service,
            credentials,
            conversations,
            known: self.known,
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// A service wired to mocks, recording every delivery.
pub struct TestHarness {
    pub service: NotificationService,
    pub credentials: Arc<MockCredentialStore>,
    pub conversations: Arc<MockConversationStore>,
    pub known: KnownUnreadThreads,
    delivered: Arc<Mutex<Vec<NotificationContent>>>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    fn capture(&self) -> ContentHandler {
        let delivered = Arc::clone(&self.delivered);
        Box::new(move |content| {
            // The handler may run inside Drop, so no await here.
            match delivered.try_lock() {
                Ok(mut list) => list.push(content),
                Err(_) => tracing::error!("delivery capture lock contended"),
            }
        })
    }

    /// Run one push through the service.
    pub async fn push(&self, request: PushRequest) -> Outcome {
        self.service.did_receive(request, self.capture()).await
    }

    /// Run one push, with a host expiry token.
    pub async fn push_with_cancel(&self, request: PushRequest, expiry: CancellationToken) -> Outcome {
        self.service
            .did_receive_with_cancel(request, self.capture(), expiry)
            .await
    }

    /// Everything delivered so far, in order.
    pub async fn delivered(&self) -> Vec<NotificationContent> {
        self.delivered.lock().await.clone()
    }

    /// The most recent delivery.
    pub async fn last_delivered(&self) -> Option<NotificationContent> {
        self.delivered.lock().await.last().cloned()
    }
}

/// A push request with the given metadata map and a generic title.
pub fn push_request(user_info: Value) -> PushRequest {
    let user_info = match user_info {
        Value::Object(map) => map.into_iter().collect(),
        _ => Default::default(),
    };
    PushRequest {
        identifier: "test-push".to_string(),
        content: NotificationContent {
            title: "New message".to_string(),
            body: String::new(),
            user_info,
            ..Default::default()
        },
    }
}

/// An unencrypted push as the push component sends it.
pub fn plain_push(account: &str, sender: Option<&str>, body: Option<&str>) -> PushRequest {
    let mut info = json!({ "account": account });
    if let Some(sender) = sender {
        info[keys::SENDER] = json!(sender);
    }
    if let Some(body) = body {
        info[keys::BODY] = json!(body);
    }
    push_request(info)
}

/// An encrypted push carrying `payload` sealed under `key`.
pub fn encrypted_push(account: &str, key: &PushKey, payload: &Payload) -> PushRequest {
    let plaintext = PayloadCodec::encode(payload).unwrap_or_default();
    encrypted_push_raw(account, key, &plaintext)
}

/// An encrypted push carrying arbitrary plaintext bytes.
pub fn encrypted_push_raw(account: &str, key: &PushKey, plaintext: &[u8]) -> PushRequest {
    match encrypt_push(key, plaintext) {
        Ok(sealed) => push_request(json!({
            "account": account,
            "encrypted": sealed.encrypted,
            "iv": sealed.iv,
        })),
        Err(e) => panic!("sealing test push failed: {e}"),
    }
}

/// Real SQLite stores in a temp directory.
pub struct SqliteFixture {
    pub dir: tempfile::TempDir,
    pub config: NudgeConfig,
    pub vault: SqliteCredentialStore,
    pub chat: Database,
}

impl SqliteFixture {
    /// Create both databases. The chat database is opened read-write for seeding.
    pub async fn new() -> Result<Self, NudgeError> {
        let dir = tempfile::TempDir::new().map_err(|e| NudgeError::Storage { source: e.into() })?;
        let chat_path = dir.path().join("chat.db").to_string_lossy().to_string();
        let vault_path = dir.path().join("credentials.db").to_string_lossy().to_string();

        let config = NudgeConfig {
            storage: StorageConfig {
                database_path: chat_path.clone(),
                ..Default::default()
            },
            vault: VaultConfig {
                database_path: vault_path,
                ..Default::default()
            },
            ..Default::default()
        };

        let vault = SqliteCredentialStore::open(&config.vault).await?;
        let chat = Database::open(&chat_path).await?;
        Ok(Self {
            dir,
            config,
            vault,
            chat,
        })
    }

    /// Register an account with a key and activity flag.
    pub async fn add_account(
        &self,
        account: &str,
        key: Option<&PushKey>,
        active: bool,
    ) -> Result<(), NudgeError> {
        let account = BareJid::parse(account)?;
        let record = AccountRecord::new(active).encode();
        self.vault.put_account(&account, key, Some(&record)).await
    }

    /// A service over fresh store handles, with the chat database read-only
    /// as in production.
    pub async fn service(&self, known: KnownUnreadThreads) -> Result<NotificationService, NudgeError> {
        let credentials = SqliteCredentialStore::open_read_only(&self.config.vault).await?;
        let conversations = SqliteConversationStore::open(&self.config.storage).await?;
        Ok(NotificationService::from_config(
            &self.config,
            Arc::new(credentials),
            Arc::new(conversations),
            known,
        ))
    }

    /// Path of a config file describing this fixture.
    pub fn write_config_file(&self) -> Result<std::path::PathBuf, NudgeError> {
        let path = self.dir.path().join("nudge.toml");
        let body = format!(
            "[storage]\ndatabase_path = {:?}\n\n[vault]\ndatabase_path = {:?}\n",
            self.config.storage.database_path, self.config.vault.database_path
        );
        std::fs::write(&path, body).map_err(|e| NudgeError::Config(e.to_string()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_push_carries_fields() {
        let request = plain_push("alice@example.com", Some("carol@example.com"), Some("hey"));
        assert_eq!(request.content.user_info_str("account"), Some("alice@example.com"));
        assert_eq!(request.content.user_info_str("sender"), Some("carol@example.com"));
        assert_eq!(request.content.user_info_str("body"), Some("hey"));
        assert_eq!(request.content.user_info_str("encrypted"), None);
    }

    #[test]
    fn encrypted_push_has_base64_fields() {
        let request = encrypted_push_raw("alice@example.com", &PushKey::new([1; 32]), b"{}");
        assert!(request.content.user_info_str("encrypted").is_some());
        assert!(request.content.user_info_str("iv").is_some());
    }

    #[tokio::test]
    async fn harness_captures_delivery() {
        let harness = TestHarness::builder().build();
        let outcome = harness.push(push_request(json!({}))).await;
        assert!(matches!(outcome, Outcome::BestAttempt(_)));
        assert_eq!(harness.delivered().await.len(), 1);
    }

    #[tokio::test]
    async fn sqlite_fixture_builds_service() {
        let fixture = SqliteFixture::new().await.unwrap();
        fixture
            .add_account("alice@example.com", Some(&PushKey::new([2; 32])), true)
            .await
            .unwrap();
        let service = fixture.service(KnownUnreadThreads::new()).await.unwrap();
        assert_eq!(service.badge().compute_badge(None).await, 0);
    }
}
