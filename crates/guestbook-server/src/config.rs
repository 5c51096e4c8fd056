use std::net::SocketAddr;

use anyhow::{Context, Result};
use guestbook_db::DbConfig;

pub const DEFAULT_LOG_FILTER: &str = "guestbook_server=debug,guestbook_api=debug,guestbook_db=info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DbConfig,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Reads the process environment. Call after `.env` has been loaded.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("CONNECTION_URL").unwrap_or_else(|| "guestbook.db".into());
        let host = lookup("GUESTBOOK_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("GUESTBOOK_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("GUESTBOOK_PORT must be a port number")?;

        Ok(Self {
            database: DbConfig::new(url),
            host,
            port,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
