// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Active account resolution.

use std::sync::Arc;

use nudge_core::{AccountRecord, BareJid, CredentialStore};
use tracing::{debug, warn};

/// Lists the accounts the user currently has switched on.
pub struct ActiveAccountResolver {
    credentials: Arc<dyn CredentialStore>,
}

impl ActiveAccountResolver {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// Active accounts in byte order of their bare JID.
    ///
    /// An account whose record is missing, unreadable or corrupt is treated as
    /// inactive. If the store cannot be enumerated the result is empty.
    pub async fn list_active_accounts(&self) -> Vec<BareJid> {
        let mut accounts = match self.credentials.list_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "account enumeration failed");
                return Vec::new();
            }
        };
        accounts.sort();
        accounts.dedup();

        let mut active = Vec::with_capacity(accounts.len());
        for account in accounts {
            if self.is_active(&account).await {
                active.push(account);
            }
        }
        debug!(count = active.len(), "active accounts resolved");
        active
    }

    async fn is_active(&self, account: &BareJid) -> bool {
        let bytes = match self.credentials.get_activity_record(account).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return false,
            Err(e) => {
                warn!(%account, error = %e, "activity record lookup failed");
                return false;
            }
        };
        match AccountRecord::decode(&bytes) {
            Ok(record) => record.active,
            Err(e) => {
                warn!(%account, error = %e, "corrupt activity record");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_test_utils::MockCredentialStore;

    fn jid(s: &str) -> BareJid {
        BareJid::parse(s).unwrap()
    }

    #[tokio::test]
    async fn filters_and_sorts() {
        let store = MockCredentialStore::new()
            .with_account(jid("zed@example.org"), None, Some(AccountRecord::new(true).encode()))
            .with_account(jid("alice@example.com"), None, Some(AccountRecord::new(true).encode()))
            .with_account(jid("bob@example.com"), None, Some(AccountRecord::new(false).encode()));
        let resolver = ActiveAccountResolver::new(Arc::new(store));

        let active = resolver.list_active_accounts().await;
        let names: Vec<&str> = active.iter().map(BareJid::as_str).collect();
        assert_eq!(names, vec!["alice@example.com", "zed@example.org"]);
    }

    #[tokio::test]
    async fn missing_and_corrupt_records_are_inactive() {
        let store = MockCredentialStore::new()
            .with_account(jid("absent@example.com"), None, None)
            .with_account(jid("corrupt@example.com"), None, Some(b"bplist00\x01".to_vec()))
            .with_account(jid("future@example.com"), None, Some(br#"{"version":9,"active":true}"#.to_vec()));
        let resolver = ActiveAccountResolver::new(Arc::new(store));
        assert!(resolver.list_active_accounts().await.is_empty());
    }

    #[tokio::test]
    async fn enumeration_failure_is_empty() {
        let store = MockCredentialStore::new()
            .with_active_account(jid("alice@example.com"), None)
            .failing();
        let resolver = ActiveAccountResolver::new(Arc::new(store));
        assert!(resolver.list_active_accounts().await.is_empty());
    }
}
