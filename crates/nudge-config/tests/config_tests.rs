// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the nudge configuration system.

use nudge_config::diagnostic::ConfigError;
use nudge_config::model::NudgeConfig;
use nudge_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_nudge_config() {
    let toml = r#"
[extension]
log_level = "debug"
deadline_ms = 20000
category = "CHAT"

[storage]
database_path = "/tmp/chat.db"
read_only = false
unread_states = [2, 6]

[vault]
database_path = "/tmp/credentials.db"
service = "jabber"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.extension.log_level, "debug");
    assert_eq!(config.extension.deadline_ms, 20_000);
    assert_eq!(config.extension.category, "CHAT");
    assert_eq!(config.storage.database_path, "/tmp/chat.db");
    assert!(!config.storage.read_only);
    assert_eq!(config.storage.unread_states, vec![2, 6]);
    assert_eq!(config.vault.database_path, "/tmp/credentials.db");
    assert_eq!(config.vault.service, "jabber");
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    let defaults = NudgeConfig::default();
    assert_eq!(config.extension.deadline_ms, defaults.extension.deadline_ms);
    assert_eq!(config.storage.unread_states, defaults.storage.unread_states);
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[extension]
deadline_sm = 100
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key should fail");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("should produce an UnknownKey diagnostic");
    assert_eq!(unknown.0, "deadline_sm");
    assert_eq!(unknown.1.as_deref(), Some("deadline_ms"));
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[extension]
deadline_ms = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("wrong type should fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("deadline_ms"))));
}

#[test]
fn semantic_validation_runs_after_parsing() {
    let toml = r#"
[extension]
deadline_ms = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero deadline should fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("deadline_ms"))));
}
