// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./nudge.toml` > `~/.config/nudge/nudge.toml` > `/etc/nudge/nudge.toml`,
//! with environment variable overrides via the `NUDGE_` prefix on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NudgeConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/nudge/nudge.toml";
pub(crate) const LOCAL_CONFIG: &str = "nudge.toml";

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/nudge/nudge.toml`
/// 3. `~/.config/nudge/nudge.toml`
/// 4. `./nudge.toml`
/// 5. `NUDGE_*` environment variables
pub fn load_config() -> Result<NudgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. Used by tests.
pub fn load_config_from_str(toml_content: &str) -> Result<NudgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NudgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NudgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NudgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NudgeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

pub(crate) fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("nudge/nudge.toml"))
}

/// Environment provider mapping `NUDGE_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys such as
/// `deadline_ms` and `database_path` contain underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("NUDGE_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("extension_", "extension.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("vault_", "vault.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[extension]
deadline_ms = 5000

[vault]
service = "chat"
"#,
            )?;
            jail.set_env("NUDGE_EXTENSION_DEADLINE_MS", "1200");
            jail.set_env("NUDGE_STORAGE_DATABASE_PATH", "/tmp/env-chat.db");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.extension.deadline_ms, 1200);
            assert_eq!(config.storage.database_path, "/tmp/env-chat.db");
            assert_eq!(config.vault.service, "chat");
            Ok(())
        });
    }

    #[test]
    fn env_keys_are_case_insensitive_per_section() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NUDGE_VAULT_SERVICE", "xmpp-push");
            jail.set_env("NUDGE_STORAGE_READ_ONLY", "false");

            let config = load_config_from_path(Path::new("absent.toml"))?;
            assert_eq!(config.vault.service, "xmpp-push");
            assert!(!config.storage.read_only);
            assert_eq!(config.extension.deadline_ms, 25_000);
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = load_config_from_path(Path::new("does-not-exist.toml"))?;
            assert_eq!(config.extension.category, "MESSAGE");
            Ok(())
        });
    }
}
