// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every external collaborator.

use async_trait::async_trait;

use crate::error::NudgeError;
use crate::types::HealthStatus;

/// Identity and health reporting for an injected collaborator.
#[async_trait]
pub trait Collaborator: Send + Sync + 'static {
    /// Human-readable name of this implementation (e.g. `"sqlite"`, `"mock"`).
    fn name(&self) -> &str;

    /// Performs a cheap liveness probe against the backing store.
    async fn health_check(&self) -> Result<HealthStatus, NudgeError>;
}
