//! Per-message ownership and visibility rules.

use guestbook_db::models::MessageRow;

/// Owners always see their messages; everyone else only public ones.
pub fn can_read(message: &MessageRow, caller: i64) -> bool {
    message.user_id == caller || !message.private
}

/// Editing and deleting are owner-only.
pub fn can_modify(message: &MessageRow, caller: i64) -> bool {
    message.user_id == caller
}

pub fn can_upvote(message: &MessageRow, caller: i64) -> bool {
    !message.private && message.user_id != caller
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: i64 = 1;
    const OTHER: i64 = 2;

    fn message(private: bool) -> MessageRow {
        MessageRow {
            id: 10,
            user_id: OWNER,
            message: "hi".into(),
            private,
            created_at: "2024-01-01 00:00:00".into(),
        }
    }

    #[test]
    fn private_messages_are_owner_only() {
        let private = message(true);
        assert!(can_read(&private, OWNER));
        assert!(!can_read(&private, OTHER));

        let public = message(false);
        assert!(can_read(&public, OWNER));
        assert!(can_read(&public, OTHER));
    }

    #[test]
    fn only_owner_modifies() {
        for private in [true, false] {
            assert!(can_modify(&message(private), OWNER));
            assert!(!can_modify(&message(private), OTHER));
        }
    }

    #[test]
    fn upvotes_need_public_message_and_another_user() {
        assert!(can_upvote(&message(false), OTHER));
        assert!(!can_upvote(&message(false), OWNER));
        assert!(!can_upvote(&message(true), OTHER));
        assert!(!can_upvote(&message(true), OWNER));
    }
}
