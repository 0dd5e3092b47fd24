// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::NudgeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate semantic constraints serde cannot express.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &NudgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.extension.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "extension.log_level `{}` must be one of {}",
                config.extension.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.extension.deadline_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "extension.deadline_ms must be greater than zero".to_string(),
        });
    }

    if config.extension.category.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "extension.category must not be empty".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.unread_states.is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.unread_states must list at least one message state".to_string(),
        });
    }

    if config.vault.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.database_path must not be empty".to_string(),
        });
    }

    if config.vault.service.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.service must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
