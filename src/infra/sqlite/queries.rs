use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::infra::sqlite::schema::open_connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user_json: String,
    pub saved_at: String,
}

pub fn save_session(db_path: &Path, token: &str, user_json: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "INSERT INTO session(id, token, user_json, saved_at)
         VALUES (1, ?1, ?2, CURRENT_TIMESTAMP)
         ON CONFLICT(id) DO UPDATE SET
            token = excluded.token,
            user_json = excluded.user_json,
            saved_at = excluded.saved_at",
        params![token, user_json],
    )
    .context("failed to save session")?;
    Ok(())
}

pub fn load_session(db_path: &Path) -> Result<Option<StoredSession>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT token, user_json, saved_at FROM session WHERE id = 1",
        [],
        |row| {
            Ok(StoredSession {
                token: row.get(0)?,
                user_json: row.get(1)?,
                saved_at: row.get(2)?,
            })
        },
    )
    .optional()
    .context("failed to load session")
}

pub fn clear_session(db_path: &Path) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute("DELETE FROM session", [])
        .context("failed to clear session")?;
    Ok(())
}

pub fn load_preference(db_path: &Path, key: &str) -> Result<Option<String>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT value FROM preference WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to load preference {key}"))
}

pub fn save_preference(db_path: &Path, key: &str, value: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute(
        "INSERT INTO preference(key, value)
         VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .with_context(|| format!("failed to save preference {key}"))?;
    Ok(())
}
