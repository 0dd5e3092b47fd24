// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-level types of the chat database.

use strum::{Display, EnumIter};

/// Delivery state of a `chat_history` row, as the chat application encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MessageState {
    Incoming,
    Outgoing,
    IncomingUnread,
    OutgoingUnsent,
    IncomingError,
    OutgoingError,
    IncomingErrorUnread,
    OutgoingErrorUnread,
}

impl MessageState {
    pub fn code(self) -> i64 {
        match self {
            Self::Incoming => 0,
            Self::Outgoing => 1,
            Self::IncomingUnread => 2,
            Self::OutgoingUnsent => 3,
            Self::IncomingError => 4,
            Self::OutgoingError => 5,
            Self::IncomingErrorUnread => 6,
            Self::OutgoingErrorUnread => 7,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|state| state.code() == code)
    }
}

/// Stored chat type codes.
pub const CHAT_TYPE_DIRECT: i64 = 0;
pub const CHAT_TYPE_GROUP: i64 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes_round_trip() {
        for code in 0..8 {
            let state = MessageState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert_eq!(MessageState::from_code(8), None);
        assert_eq!(MessageState::from_code(-1), None);
    }

    #[test]
    fn default_unread_states_match_codes() {
        let unread: Vec<i64> = [
            MessageState::IncomingUnread,
            MessageState::IncomingErrorUnread,
            MessageState::OutgoingErrorUnread,
        ]
        .into_iter()
        .map(MessageState::code)
        .collect();
        assert_eq!(unread, nudge_config::model::StorageConfig::default().unread_states);
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(MessageState::IncomingErrorUnread.to_string(), "incoming_error_unread");
    }
}
