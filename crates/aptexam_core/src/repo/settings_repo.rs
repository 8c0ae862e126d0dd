//! System settings repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `put_setting` upserts and refreshes `updated_at` on every write.
//! - Keys are treated as opaque, case-sensitive identifiers.

use crate::model::settings::SystemSetting;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row};

/// Repository interface for system settings.
pub trait SettingsRepository {
    /// Gets one setting by key.
    fn get_setting(&self, key: &str) -> RepoResult<Option<SystemSetting>>;
    /// Inserts or replaces one setting value.
    fn put_setting(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Lists all settings ordered by key.
    fn list_settings(&self) -> RepoResult<Vec<SystemSetting>>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_setting(&self, key: &str) -> RepoResult<Option<SystemSetting>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value, updated_at
             FROM system_settings
             WHERE key = ?1;",
        )?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_setting_row(row)?));
        }
        Ok(None)
    }

    fn put_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO system_settings (key, value)
             VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn list_settings(&self) -> RepoResult<Vec<SystemSetting>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value, updated_at
             FROM system_settings
             ORDER BY key ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut settings = Vec::new();
        while let Some(row) = rows.next()? {
            settings.push(parse_setting_row(row)?);
        }
        Ok(settings)
    }
}

fn parse_setting_row(row: &Row<'_>) -> RepoResult<SystemSetting> {
    Ok(SystemSetting {
        key: row.get("key")?,
        value: row.get("value")?,
        updated_at: row.get("updated_at")?,
    })
}
