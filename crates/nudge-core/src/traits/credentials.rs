// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the secure credential store.

use async_trait::async_trait;

use crate::error::NudgeError;
use crate::jid::BareJid;
use crate::traits::collaborator::Collaborator;
use crate::types::PushKey;

/// Per-account secrets and the account activity blob.
///
/// Implementations never hand out anything but the push key; account
/// passwords and other secrets stay inside the store.
#[async_trait]
pub trait CredentialStore: Collaborator {
    /// All accounts registered in the store, in no particular order.
    async fn list_accounts(&self) -> Result<Vec<BareJid>, NudgeError>;

    /// The push decryption key for `account`, if one was provisioned.
    async fn get_key(&self, account: &BareJid) -> Result<Option<PushKey>, NudgeError>;

    /// The raw persisted activity record for `account`. Decoding is left to
    /// the caller so that a corrupt blob can fail closed.
    async fn get_activity_record(&self, account: &BareJid)
        -> Result<Option<Vec<u8>>, NudgeError>;
}
