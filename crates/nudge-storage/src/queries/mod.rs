// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the chat database.

pub mod conversations;
pub mod unread;
