// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for nudge integration tests.
//!
//! Provides `MockCredentialStore` and `MockConversationStore` for deterministic
//! collaborator behavior, plus `TestHarness` and `SqliteFixture` for driving
//! the whole push pipeline.

pub mod harness;
pub mod mock_conversations;
pub mod mock_credentials;

pub use harness::{
    SqliteFixture, TestHarness, TestHarnessBuilder, encrypted_push, encrypted_push_raw,
    plain_push, push_request,
};
pub use mock_conversations::MockConversationStore;
pub use mock_credentials::MockCredentialStore;
