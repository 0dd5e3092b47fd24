// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation name and kind lookup.

use nudge_core::{BareJid, ConversationInfo, MessageKind, NudgeError};
use rusqlite::{OptionalExtension, named_params};

use crate::database::{Database, map_tr_err};
use crate::models::CHAT_TYPE_DIRECT;

/// Roster contacts come out as the direct type, rooms as their stored type. Rooms sort
/// first so a JID that is both a contact and a joined room resolves as a room.
const NAME_AND_KIND_SQL: &str = "
    SELECT name, :direct AS type FROM roster_items
     WHERE account = :account AND jid = :jid
    UNION
    SELECT name, type FROM chats
     WHERE account = :account AND jid = :jid AND type > :direct
    ORDER BY type DESC
    LIMIT 1";

/// Look up the display name and stored kind of one conversation.
pub async fn find_name_and_kind(
    db: &Database,
    account: &BareJid,
    peer: &BareJid,
) -> Result<Option<ConversationInfo>, NudgeError> {
    let account = account.to_string();
    let peer = peer.to_string();

    db.connection()
        .call(move |conn| -> Result<Option<ConversationInfo>, rusqlite::Error> {
            let mut stmt = conn.prepare_cached(NAME_AND_KIND_SQL)?;
            stmt.query_row(named_params! { ":account": account, ":jid": peer, ":direct": CHAT_TYPE_DIRECT }, |row| {
                let name: Option<String> = row.get(0)?;
                let code: i64 = row.get(1)?;
                Ok(ConversationInfo {
                    name: name.filter(|n| !n.is_empty()),
                    kind: MessageKind::from_stored(code),
                })
            })
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use tempfile::TempDir;

    fn jid(s: &str) -> BareJid {
        BareJid::parse(s).unwrap()
    }

    async fn setup() -> (Database, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn roster_contact_is_direct() {
        let (db, _dir) = setup().await;
        seed::upsert_roster_item(&db, "alice@example.com", "bob@example.com", Some("Bob"))
            .await
            .unwrap();

        let info = find_name_and_kind(&db, &jid("alice@example.com"), &jid("bob@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.name.as_deref(), Some("Bob"));
        assert_eq!(info.kind, MessageKind::Direct);
    }

    #[tokio::test]
    async fn room_wins_over_roster_entry() {
        let (db, _dir) = setup().await;
        seed::upsert_roster_item(&db, "alice@example.com", "team@rooms.example.com", Some("Contact"))
            .await
            .unwrap();
        seed::upsert_chat(&db, "alice@example.com", "team@rooms.example.com", 1, Some("Team Room"))
            .await
            .unwrap();

        let info = find_name_and_kind(&db, &jid("alice@example.com"), &jid("team@rooms.example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.name.as_deref(), Some("Team Room"));
        assert_eq!(info.kind, MessageKind::GroupChat);
    }

    #[tokio::test]
    async fn direct_chat_rows_are_ignored() {
        let (db, _dir) = setup().await;
        seed::upsert_chat(&db, "alice@example.com", "carol@example.com", 0, Some("Carol"))
            .await
            .unwrap();

        let info = find_name_and_kind(&db, &jid("alice@example.com"), &jid("carol@example.com"))
            .await
            .unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn empty_name_is_none() {
        let (db, _dir) = setup().await;
        seed::upsert_roster_item(&db, "alice@example.com", "dave@example.com", Some(""))
            .await
            .unwrap();
        let info = find_name_and_kind(&db, &jid("alice@example.com"), &jid("dave@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.name, None);
    }

    #[tokio::test]
    async fn other_account_is_not_visible() {
        let (db, _dir) = setup().await;
        seed::upsert_roster_item(&db, "alice@example.com", "bob@example.com", Some("Bob"))
            .await
            .unwrap();
        let info = find_name_and_kind(&db, &jid("mallory@example.com"), &jid("bob@example.com"))
            .await
            .unwrap();
        assert!(info.is_none());
    }
}
