// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded chat schema migrations using refinery.
//!
//! Only read-write opens run them; the extension opens the application's
//! database read-only and expects the schema to be in place.

use nudge_core::NudgeError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), refinery::Error> {
    embedded::migrations::runner().run(conn)?;
    Ok(())
}

pub(crate) fn map_migration_err(e: tokio_rusqlite::Error<refinery::Error>) -> NudgeError {
    NudgeError::Storage {
        source: format!("chat schema migration failed: {e}").into(),
    }
}
