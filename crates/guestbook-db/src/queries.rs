use rusqlite::types::Value;

use crate::models::{MessageRow, PopularMessageRow, TokenRow, UserRow};
use crate::statement::{Filter, Select, Table, delete, get, get_one, update, write};
use crate::{Database, DbError};

impl Database {
    // -- Users --

    /// Inserts an inactive user and its activation token. Both rows are
    /// written in one transaction, so a failure leaves neither behind.
    pub fn register_user(&self, email: &str, password_hash: &str, token: &str) -> Result<i64, DbError> {
        self.with_tx(|tx| {
            let user_id = write(
                tx,
                Table::Users,
                &[("email", text(email)), ("password", text(password_hash))],
            )?;
            write(
                tx,
                Table::Tokens,
                &[("token", text(token)), ("user_id", Value::Integer(user_id))],
            )?;
            Ok(user_id)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
        self.with_conn(|conn| {
            get_one(conn, Select::new().filter(Filter::new().eq("email", email.to_owned())))
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>, DbError> {
        self.with_conn(|conn| get_one(conn, Select::new().filter(Filter::new().eq("id", id))))
    }

    /// Flips an inactive user to active. Returns false if the user was
    /// already active (or does not exist).
    pub fn activate_user(&self, user_id: i64) -> Result<bool, DbError> {
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.with_conn(|conn| {
            let changed = update(
                conn,
                Table::Users,
                &[("active", Value::from(true)), ("activated_at", Value::Text(now))],
                &Filter::new().eq("id", user_id).eq("active", false),
            )?;
            Ok(changed == 1)
        })
    }

    // -- Tokens --

    pub fn get_token(&self, token: &str) -> Result<Option<TokenRow>, DbError> {
        self.with_conn(|conn| {
            get_one(conn, Select::new().filter(Filter::new().eq("token", token.to_owned())))
        })
    }

    pub fn get_token_for_user(&self, user_id: i64) -> Result<Option<TokenRow>, DbError> {
        self.with_conn(|conn| get_one(conn, Select::new().filter(Filter::new().eq("user_id", user_id))))
    }

    // -- Messages --

    pub fn insert_message(&self, user_id: i64, message: &str, private: bool) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            write(
                conn,
                Table::Messages,
                &[
                    ("user_id", Value::Integer(user_id)),
                    ("message", text(message)),
                    ("private", Value::from(private)),
                ],
            )
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>, DbError> {
        self.with_conn(|conn| get_one(conn, Select::new().filter(Filter::new().eq("id", id))))
    }

    /// Public messages plus the caller's private ones, in storage order.
    pub fn list_visible_messages(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>, DbError> {
        self.with_conn(|conn| {
            get(
                conn,
                &Select::new()
                    .filter(Filter::new().eq("private", false))
                    .or_filter(Filter::new().eq("user_id", user_id).eq("private", true))
                    .limit(limit),
            )
        })
    }

    /// Public matches followed by the caller's private matches. Each half is
    /// capped at `limit` separately and the results are not de-duplicated.
    pub fn search_messages(&self, user_id: i64, term: &str, limit: u32) -> Result<Vec<MessageRow>, DbError> {
        self.with_conn(|conn| {
            let mut rows: Vec<MessageRow> = get(
                conn,
                &Select::new()
                    .filter(Filter::new().eq("private", false))
                    .contains("message", term)
                    .limit(limit),
            )?;
            let private: Vec<MessageRow> = get(
                conn,
                &Select::new()
                    .filter(Filter::new().eq("private", true).eq("user_id", user_id))
                    .contains("message", term)
                    .limit(limit),
            )?;
            rows.extend(private);
            Ok(rows)
        })
    }

    pub fn update_message(&self, id: i64, message: &str, private: bool) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            update(
                conn,
                Table::Messages,
                &[("message", text(message)), ("private", Value::from(private))],
                &Filter::new().eq("id", id),
            )
        })
    }

    /// Deletes only when `user_id` owns the message; otherwise affects no rows.
    pub fn delete_message(&self, user_id: i64, id: i64) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            delete(conn, Table::Messages, &Filter::new().eq("user_id", user_id).eq("id", id))
        })
    }

    // -- Upvotes --

    pub fn insert_upvote(&self, user_id: i64, message_id: i64) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            write(
                conn,
                Table::Upvotes,
                &[("user_id", Value::Integer(user_id)), ("message_id", Value::Integer(message_id))],
            )
        })
    }

    pub fn popular_messages(&self) -> Result<Vec<PopularMessageRow>, DbError> {
        self.with_conn(|conn| get(conn, &Select::new()))
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_owned())
}
