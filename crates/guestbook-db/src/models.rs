//! Database row types. These map directly to SQLite rows and are kept apart
//! from the `guestbook-types` wire types so the DB layer stays independent.

use rusqlite::Row;

use crate::statement::{FromRow, Table};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub active: bool,
    pub activated_at: Option<String>,
    pub created_at: String,
}

impl FromRow for UserRow {
    const TABLE: Table = Table::Users;
    const COLUMNS: &'static [&'static str] =
        &["id", "email", "password", "active", "activated_at", "created_at"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
            active: row.get(3)?,
            activated_at: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TokenRow {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
}

impl FromRow for TokenRow {
    const TABLE: Table = Table::Tokens;
    const COLUMNS: &'static [&'static str] = &["id", "token", "user_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            token: row.get(1)?,
            user_id: row.get(2)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub private: bool,
    pub created_at: String,
}

impl FromRow for MessageRow {
    const TABLE: Table = Table::Messages;
    const COLUMNS: &'static [&'static str] = &["id", "user_id", "message", "private", "created_at"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            message: row.get(2)?,
            private: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

/// One row of the `popular_messages` view.
#[derive(Debug, Clone)]
pub struct PopularMessageRow {
    pub id: i64,
    pub message: String,
    pub upvotes: i64,
}

impl FromRow for PopularMessageRow {
    const TABLE: Table = Table::PopularMessages;
    const COLUMNS: &'static [&'static str] = &["id", "message", "upvotes"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            message: row.get(1)?,
            upvotes: row.get(2)?,
        })
    }
}
