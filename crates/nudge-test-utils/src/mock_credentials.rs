// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory credential store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use nudge_core::{
    AccountRecord, BareJid, Collaborator, CredentialStore, HealthStatus, NudgeError, PushKey,
};

#[derive(Clone)]
struct Entry {
    key: Option<PushKey>,
    record: Option<Vec<u8>>,
}

/// A credential store for tests.
///
/// Configured up front with builder methods; counts key lookups so tests can
/// assert that the decryptor was or was not consulted.
#[derive(Default)]
pub struct MockCredentialStore {
    accounts: BTreeMap<BareJid, Entry>,
    failing: bool,
    key_lookups: AtomicUsize,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with an optional key and raw activity record.
    pub fn with_account(
        mut self,
        account: BareJid,
        key: Option<PushKey>,
        record: Option<Vec<u8>>,
    ) -> Self {
        self.accounts.insert(account, Entry { key, record });
        self
    }

    /// Register an account flagged active.
    pub fn with_active_account(self, account: BareJid, key: Option<PushKey>) -> Self {
        self.with_account(account, key, Some(AccountRecord::new(true).encode()))
    }

    /// Make every call fail with a lookup error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn key_lookups(&self) -> usize {
        self.key_lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), NudgeError> {
        if self.failing {
            return Err(NudgeError::lookup("credential store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl Collaborator for MockCredentialStore {
    fn name(&self) -> &str {
        "mock-credentials"
    }

    async fn health_check(&self) -> Result<HealthStatus, NudgeError> {
        if self.failing {
            return Ok(HealthStatus::Unhealthy("configured to fail".into()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn list_accounts(&self) -> Result<Vec<BareJid>, NudgeError> {
        self.check()?;
        // Reverse order, so callers cannot rely on the store sorting.
        Ok(self.accounts.keys().rev().cloned().collect())
    }

    async fn get_key(&self, account: &BareJid) -> Result<Option<PushKey>, NudgeError> {
        self.key_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.accounts.get(account).and_then(|e| e.key.clone()))
    }

    async fn get_activity_record(&self, account: &BareJid) -> Result<Option<Vec<u8>>, NudgeError> {
        self.check()?;
        Ok(self.accounts.get(account).and_then(|e| e.record.clone()))
    }
}
