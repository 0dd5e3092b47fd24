// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write helpers mirroring what the chat application stores.
//!
//! The extension itself only reads. These seed fixture databases and are
//! compiled only for tests and the `test-utils` feature.

use nudge_core::NudgeError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::MessageState;

fn ensure_writable(db: &Database) -> Result<(), NudgeError> {
    if db.is_read_only() {
        return Err(NudgeError::Storage {
            source: "chat database is open read-only".into(),
        });
    }
    Ok(())
}

/// Insert or replace a roster entry.
pub async fn upsert_roster_item(
    db: &Database,
    account: &str,
    jid: &str,
    name: Option<&str>,
) -> Result<(), NudgeError> {
    ensure_writable(db)?;
    let account = account.to_string();
    let jid = jid.to_string();
    let name = name.map(str::to_string);

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO roster_items (account, jid, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT (account, jid) DO UPDATE SET name = excluded.name",
                params![account, jid, name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a chat row. `chat_type` 0 is one-to-one, anything above is a room.
pub async fn upsert_chat(
    db: &Database,
    account: &str,
    jid: &str,
    chat_type: i64,
    name: Option<&str>,
) -> Result<(), NudgeError> {
    ensure_writable(db)?;
    let account = account.to_string();
    let jid = jid.to_string();
    let name = name.map(str::to_string);

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO chats (account, jid, type, name) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (account, jid) DO UPDATE SET type = excluded.type, name = excluded.name",
                params![account, jid, chat_type, name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Append one message to the history.
pub async fn insert_message(
    db: &Database,
    account: &str,
    jid: &str,
    author_jid: Option<&str>,
    data: Option<&str>,
    timestamp: i64,
    state: MessageState,
) -> Result<(), NudgeError> {
    ensure_writable(db)?;
    let account = account.to_string();
    let jid = jid.to_string();
    let author_jid = author_jid.map(str::to_string);
    let data = data.map(str::to_string);
    let state = state.code();

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO chat_history (account, jid, author_jid, data, timestamp, state)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![account, jid, author_jid, data, timestamp, state],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Mark every message of one conversation as read (incoming) or sent (outgoing).
pub async fn mark_conversation_read(
    db: &Database,
    account: &str,
    jid: &str,
) -> Result<usize, NudgeError> {
    ensure_writable(db)?;
    let account = account.to_string();
    let jid = jid.to_string();

    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE chat_history
                    SET state = CASE state
                        WHEN ?3 THEN ?4
                        WHEN ?5 THEN ?6
                        WHEN ?7 THEN ?8
                        ELSE state END
                  WHERE account = ?1 AND jid = ?2 AND state IN (?3, ?5, ?7)",
                params![
                    account,
                    jid,
                    MessageState::IncomingUnread.code(),
                    MessageState::Incoming.code(),
                    MessageState::IncomingErrorUnread.code(),
                    MessageState::IncomingError.code(),
                    MessageState::OutgoingErrorUnread.code(),
                    MessageState::OutgoingError.code(),
                ],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}
