// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unread conversation enumeration.

use nudge_core::{BareJid, ConversationId, NudgeError};
use rusqlite::params_from_iter;
use tracing::warn;

use crate::database::{Database, map_tr_err};

fn unread_sql(state_count: usize) -> String {
    let placeholders = vec!["?"; state_count].join(", ");
    format!(
        "SELECT c.account, c.jid FROM chats c
           JOIN chat_history h ON h.account = c.account AND h.jid = c.jid
          WHERE h.state IN ({placeholders})
          GROUP BY c.account, c.jid
          ORDER BY c.account, c.jid"
    )
}

/// Every conversation with at least one message in one of `states`.
///
/// Rows whose account or peer is not a valid JID are skipped.
pub async fn list_unread_conversations(
    db: &Database,
    states: &[i64],
) -> Result<Vec<ConversationId>, NudgeError> {
    if states.is_empty() {
        return Ok(Vec::new());
    }
    let sql = unread_sql(states.len());
    let states = states.to_vec();

    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<(String, String)>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(states.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    let mut conversations = Vec::with_capacity(rows.len());
    for (account, peer) in rows {
        match (BareJid::parse(&account), BareJid::parse(&peer)) {
            (Ok(account), Ok(peer)) => conversations.push(ConversationId::new(account, peer)),
            _ => warn!(%account, %peer, "skipping unread conversation with malformed jid"),
        }
    }
    Ok(conversations)
}
