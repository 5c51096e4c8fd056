pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod statement;

pub use error::DbError;

use anyhow::Result;
use rusqlite::{Connection, Transaction};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// Connection settings handed to [`Database::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// A file path, `sqlite://path`, or `:memory:`.
    pub url: String,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Resolves the URL to a file path, or `None` for an in-memory database.
    pub fn path(&self) -> Option<PathBuf> {
        let raw = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))
            .unwrap_or(&self.url);

        if raw.is_empty() || raw == ":memory:" {
            None
        } else {
            Some(PathBuf::from(raw))
        }
    }
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(config: &DbConfig) -> Result<Self> {
        let conn = match config.path() {
            Some(path) => {
                let conn = Connection::open(&path)?;
                // WAL mode for concurrent reads
                conn.pragma_update(None, "journal_mode", "WAL")?;
                info!("Database opened at {}", path.display());
                conn
            }
            None => {
                info!("Database opened in memory");
                Connection::open_in_memory()?
            }
        };

        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        // Substring search matches case exactly.
        conn.pragma_update(None, "case_sensitive_like", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with exclusive access to the connection. The guard is dropped
    /// when `f` returns, on success and error alike.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self.conn.lock().map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&conn)
    }

    /// Like [`Database::with_conn`] but inside a transaction that commits only
    /// if `f` succeeds. Dropping an uncommitted transaction rolls it back.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, DbError>,
    {
        let mut conn = self.conn.lock().map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
