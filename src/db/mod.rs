//! Database module - SQLite key-value storage for credentials and user data

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::models::{Credential, UserData};

/// Key holding the array of all credential records
pub const USERS_KEY: &str = "fitplanner_users";

/// Prefix of the per-identity data key
pub const DATA_PREFIX: &str = "fitplanner_data_";

pub fn data_key(email: &str) -> String {
    format!("{DATA_PREFIX}{email}")
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening database {path}"))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Fresh database that lives only as long as the handle
    pub fn open_in_memory() -> Result<Self> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Raw string value for a key
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Insert or overwrite a raw string value
    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).with_context(|| format!("decoding {key}"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }

    /// All registered credentials
    pub fn get_users(&self) -> Result<Vec<Credential>> {
        Ok(self.get_json(USERS_KEY)?.unwrap_or_default())
    }

    /// Append a credential record
    pub fn save_user(&self, user: &Credential) -> Result<()> {
        let mut users = self.get_users()?;
        users.push(user.clone());
        self.set_json(USERS_KEY, &users)
    }

    /// Stored data for an identity, if any
    pub fn get_user_data(&self, email: &str) -> Result<Option<UserData>> {
        self.get_json(&data_key(email))
    }

    /// Overwrite the stored data for an identity
    pub fn save_user_data(&self, email: &str, data: &UserData) -> Result<()> {
        self.set_json(&data_key(email), data)
    }

    /// Make every later write fail
    #[cfg(test)]
    pub(crate) fn drop_schema(&self) -> Result<()> {
        self.conn.execute("DROP TABLE kv", [])?;
        Ok(())
    }
}
