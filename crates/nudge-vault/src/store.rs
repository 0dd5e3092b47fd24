// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed credential store.
//!
//! One row per (service, account). The extension reads push keys and account
//! records through [`SqliteCredentialStore::open_read_only`]; rows are written
//! by the chat application when an account is configured, which
//! [`SqliteCredentialStore::open`] and [`SqliteCredentialStore::put_account`]
//! mirror for provisioning.

use async_trait::async_trait;
use nudge_config::model::VaultConfig;
use nudge_core::{BareJid, Collaborator, CredentialStore, HealthStatus, NudgeError, PushKey};
use rusqlite::{params, OpenFlags, OptionalExtension};
use tracing::{debug, warn};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Credential store reading the `credentials` table for one service name.
pub struct SqliteCredentialStore {
    conn: tokio_rusqlite::Connection,
    service: String,
    read_only: bool,
}

impl std::fmt::Debug for SqliteCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCredentialStore")
            .field("service", &self.service)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl SqliteCredentialStore {
    /// Open (creating if needed) the credential store described by `config`.
    pub async fn open(config: &VaultConfig) -> Result<Self, NudgeError> {
        let conn = tokio_rusqlite::Connection::open(&config.database_path)
            .await
            .map_err(|e| NudgeError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| -> Result<(), refinery::Error> {
            embedded::migrations::runner().run(conn)?;
            Ok(())
        })
        .await
        .map_err(|e| NudgeError::Storage {
            source: e.to_string().into(),
        })?;

        debug!(path = %config.database_path, service = %config.service, "credential store opened read-write");
        Ok(Self {
            conn,
            service: config.service.clone(),
            read_only: false,
        })
    }

    /// Open an existing credential store without write access.
    ///
    /// A missing file is an error; nothing is created or migrated.
    pub async fn open_read_only(config: &VaultConfig) -> Result<Self, NudgeError> {
        let conn = tokio_rusqlite::Connection::open_with_flags(
            &config.database_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .await
        .map_err(|e| NudgeError::Storage {
            source: Box::new(e),
        })?;

        debug!(path = %config.database_path, service = %config.service, "credential store opened read-only");
        Ok(Self {
            conn,
            service: config.service.clone(),
            read_only: true,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Insert or replace the credentials of one account.
    pub async fn put_account(
        &self,
        account: &BareJid,
        key: Option<&PushKey>,
        record: Option<&[u8]>,
    ) -> Result<(), NudgeError> {
        if self.read_only {
            return Err(NudgeError::Storage {
                source: "credential store is open read-only".into(),
            });
        }
        let service = self.service.clone();
        let account = account.to_string();
        let key = key.map(|k| k.expose().to_vec());
        let record = record.map(<[u8]>::to_vec);

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO credentials (service, account, push_key, generic)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![service, account, key, record],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn column(&self, account: &BareJid, column: &'static str) -> Result<Option<Vec<u8>>, NudgeError> {
        let service = self.service.clone();
        let account = account.to_string();
        let sql = format!("SELECT {column} FROM credentials WHERE service = ?1 AND account = ?2");

        let value = self
            .conn
            .call(move |conn| -> Result<Option<Option<Vec<u8>>>, rusqlite::Error> {
                conn.query_row(&sql, params![service, account], |row| row.get(0))
                    .optional()
            })
            .await
            .map_err(map_tr_err)?;

        Ok(value.flatten())
    }
}

#[async_trait]
impl Collaborator for SqliteCredentialStore {
    fn name(&self) -> &str {
        "sqlite-credentials"
    }

    async fn health_check(&self) -> Result<HealthStatus, NudgeError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1 FROM credentials LIMIT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn list_accounts(&self) -> Result<Vec<BareJid>, NudgeError> {
        let service = self.service.clone();
        let names = self
            .conn
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT account FROM credentials WHERE service = ?1")?;
                let rows = stmt.query_map(params![service], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)?;

        Ok(names
            .into_iter()
            .filter_map(|name| match BareJid::parse(&name) {
                Ok(jid) => Some(jid),
                Err(e) => {
                    warn!(error = %e, "skipping credential row with invalid account");
                    None
                }
            })
            .collect())
    }

    async fn get_key(&self, account: &BareJid) -> Result<Option<PushKey>, NudgeError> {
        match self.column(account, "push_key").await? {
            Some(bytes) => PushKey::from_slice(&bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn get_activity_record(&self, account: &BareJid) -> Result<Option<Vec<u8>>, NudgeError> {
        self.column(account, "generic").await
    }
}

fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> NudgeError {
    NudgeError::Lookup {
        message: format!("credential store error: {e}"),
        source: Some(Box::new(e)),
    }
}
