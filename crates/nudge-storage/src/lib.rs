// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite access to the chat application's database.
//!
//! The push extension opens the database read-only and runs two queries: the
//! display name and kind of one conversation, and the set of conversations
//! holding unread messages. Statements run on tokio-rusqlite's background
//! thread.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
#[cfg(any(test, feature = "test-utils"))]
pub mod seed;

pub use adapter::SqliteConversationStore;
pub use database::Database;
pub use models::MessageState;
