//! Geographic lookup repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide province/locality lookups for candidate registration.
//!
//! # Invariants
//! - Province and locality listings are ordered by name (NOCASE).
//! - Locality inserts require an existing province (FK enforced).

use crate::model::geo::{Locality, LocalityId, Province, ProvinceId};
use crate::repo::{map_write_error, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for geographic lookups.
pub trait GeoRepository {
    /// Inserts one province and returns its row id.
    fn insert_province(&self, name: &str) -> RepoResult<ProvinceId>;
    /// Inserts one locality under a province and returns its row id.
    fn insert_locality(&self, province_id: ProvinceId, name: &str) -> RepoResult<LocalityId>;
    /// Gets one province by id.
    fn get_province(&self, id: ProvinceId) -> RepoResult<Option<Province>>;
    /// Finds one province by name, case-insensitively.
    fn find_province_by_name(&self, name: &str) -> RepoResult<Option<Province>>;
    /// Lists all provinces ordered by name.
    fn list_provinces(&self) -> RepoResult<Vec<Province>>;
    /// Gets one locality by id.
    fn get_locality(&self, id: LocalityId) -> RepoResult<Option<Locality>>;
    /// Lists localities of one province ordered by name.
    fn list_localities(&self, province_id: ProvinceId) -> RepoResult<Vec<Locality>>;
}

/// SQLite-backed geographic repository.
pub struct SqliteGeoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGeoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GeoRepository for SqliteGeoRepository<'_> {
    fn insert_province(&self, name: &str) -> RepoResult<ProvinceId> {
        self.conn
            .execute("INSERT INTO provinces (name) VALUES (?1);", [name.trim()])
            .map_err(|err| map_write_error(err, "province"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_locality(&self, province_id: ProvinceId, name: &str) -> RepoResult<LocalityId> {
        self.conn
            .execute(
                "INSERT INTO localities (province_id, name) VALUES (?1, ?2);",
                params![province_id, name.trim()],
            )
            .map_err(|err| map_write_error(err, "locality"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_province(&self, id: ProvinceId) -> RepoResult<Option<Province>> {
        let province = self
            .conn
            .query_row(
                "SELECT id, name FROM provinces WHERE id = ?1;",
                [id],
                parse_province_row,
            )
            .optional()?;
        Ok(province)
    }

    fn find_province_by_name(&self, name: &str) -> RepoResult<Option<Province>> {
        let province = self
            .conn
            .query_row(
                "SELECT id, name FROM provinces WHERE name = ?1 COLLATE NOCASE;",
                [name.trim()],
                parse_province_row,
            )
            .optional()?;
        Ok(province)
    }

    fn list_provinces(&self) -> RepoResult<Vec<Province>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM provinces ORDER BY name COLLATE NOCASE ASC;")?;
        let mut rows = stmt.query([])?;
        let mut provinces = Vec::new();
        while let Some(row) = rows.next()? {
            provinces.push(parse_province_row(row)?);
        }
        Ok(provinces)
    }

    fn get_locality(&self, id: LocalityId) -> RepoResult<Option<Locality>> {
        let locality = self
            .conn
            .query_row(
                "SELECT id, province_id, name FROM localities WHERE id = ?1;",
                [id],
                parse_locality_row,
            )
            .optional()?;
        Ok(locality)
    }

    fn list_localities(&self, province_id: ProvinceId) -> RepoResult<Vec<Locality>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, province_id, name
             FROM localities
             WHERE province_id = ?1
             ORDER BY name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([province_id])?;
        let mut localities = Vec::new();
        while let Some(row) = rows.next()? {
            localities.push(parse_locality_row(row)?);
        }
        Ok(localities)
    }
}

fn parse_province_row(row: &Row<'_>) -> rusqlite::Result<Province> {
    Ok(Province {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn parse_locality_row(row: &Row<'_>) -> rusqlite::Result<Locality> {
    Ok(Locality {
        id: row.get("id")?,
        province_id: row.get("province_id")?,
        name: row.get("name")?,
    })
}
