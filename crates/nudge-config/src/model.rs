// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the nudge push extension.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NudgeConfig {
    /// Extension runtime settings.
    #[serde(default)]
    pub extension: ExtensionConfig,

    /// Chat database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Credential store settings.
    #[serde(default)]
    pub vault: VaultConfig,
}

/// Extension runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Wall-clock budget for one push, in milliseconds. When it elapses the
    /// best content built so far is delivered.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Category identifier attached to every chat-message notification.
    #[serde(default = "default_category")]
    pub category: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            deadline_ms: default_deadline_ms(),
            category: default_category(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_deadline_ms() -> u64 {
    // Hosts typically grant about 30 seconds; leave room to deliver.
    25_000
}

fn default_category() -> String {
    "MESSAGE".to_string()
}

/// Chat database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the chat application's SQLite database.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Open the database read-only. The extension never writes to it.
    #[serde(default = "default_read_only")]
    pub read_only: bool,

    /// Message state codes that count a conversation as unread
    /// (incoming unread, incoming error unread, outgoing error unread).
    #[serde(default = "default_unread_states")]
    pub unread_states: Vec<i64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            read_only: default_read_only(),
            unread_states: default_unread_states(),
        }
    }
}

fn default_database_path() -> String {
    data_file("chat.db")
}

fn default_read_only() -> bool {
    true
}

fn default_unread_states() -> Vec<i64> {
    vec![2, 6, 7]
}

/// Credential store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Path to the SQLite credential store.
    #[serde(default = "default_vault_path")]
    pub database_path: String,

    /// Service name the account credentials are filed under.
    #[serde(default = "default_service")]
    pub service: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            database_path: default_vault_path(),
            service: default_service(),
        }
    }
}

fn default_vault_path() -> String {
    data_file("credentials.db")
}

fn default_service() -> String {
    "xmpp".to_string()
}

fn data_file(name: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("nudge").join(name))
        .unwrap_or_else(|| std::path::PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}
