// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The extension only reads from its collaborators. Production builds inject
//! the SQLite-backed implementations, tests inject mocks; all of them use
//! `#[async_trait]` so they can live behind `Arc<dyn ...>`.

pub mod collaborator;
pub mod conversations;
pub mod credentials;

pub use collaborator::Collaborator;
pub use conversations::ConversationStore;
pub use credentials::CredentialStore;
