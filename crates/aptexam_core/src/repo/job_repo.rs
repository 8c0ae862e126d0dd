//! Job catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide role/position persistence and the candidate compatibility
//!   filter.
//!
//! # Invariants
//! - Compatibility matching only considers active roles and positions.
//! - A `NULL` minimum score never excludes a candidate.
//! - Position listing is deterministic: `title ASC, id ASC`.

use crate::model::geo::ProvinceId;
use crate::model::job::{JobPosition, PositionId, ProfessionalRole, RoleId};
use crate::repo::{map_write_error, parse_bool_column, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const POSITIONS_DEFAULT_LIMIT: u32 = 20;
const POSITIONS_LIMIT_MAX: u32 = 100;

const POSITION_SELECT_SQL: &str = "SELECT
    id,
    title,
    role_id,
    province_id,
    min_score,
    is_active
FROM job_positions";

/// Query options for position listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionListQuery {
    /// Restrict to one professional role.
    pub role_id: Option<RoleId>,
    /// Restrict to one province.
    pub province_id: Option<ProvinceId>,
    /// When set, only active positions are returned.
    pub active_only: bool,
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for the job catalog.
pub trait JobRepository {
    /// Inserts one professional role and returns its row id.
    fn insert_role(&self, name: &str, min_score: Option<i64>) -> RepoResult<RoleId>;
    /// Gets one role by id.
    fn get_role(&self, id: RoleId) -> RepoResult<Option<ProfessionalRole>>;
    /// Lists roles ordered by name.
    fn list_roles(&self, active_only: bool) -> RepoResult<Vec<ProfessionalRole>>;
    /// Inserts one position and returns its row id.
    fn insert_position(
        &self,
        title: &str,
        role_id: RoleId,
        province_id: Option<ProvinceId>,
        min_score: Option<i64>,
    ) -> RepoResult<PositionId>;
    /// Gets one position by id.
    fn get_position(&self, id: PositionId) -> RepoResult<Option<JobPosition>>;
    /// Lists positions using catalog filters + pagination.
    fn list_positions(&self, query: &PositionListQuery) -> RepoResult<Vec<JobPosition>>;
    /// Finds active positions whose thresholds admit the given exam score.
    fn find_compatible_positions(&self, score: i64) -> RepoResult<Vec<JobPosition>>;
    /// Closes one position for future matching.
    fn deactivate_position(&self, id: PositionId) -> RepoResult<()>;
}

/// SQLite-backed job catalog repository.
pub struct SqliteJobRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJobRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JobRepository for SqliteJobRepository<'_> {
    fn insert_role(&self, name: &str, min_score: Option<i64>) -> RepoResult<RoleId> {
        self.conn
            .execute(
                "INSERT INTO professional_roles (name, min_score) VALUES (?1, ?2);",
                params![name.trim(), min_score],
            )
            .map_err(|err| map_write_error(err, "professional role"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_role(&self, id: RoleId) -> RepoResult<Option<ProfessionalRole>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, min_score, is_active
             FROM professional_roles
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_role_row(row)?));
        }
        Ok(None)
    }

    fn list_roles(&self, active_only: bool) -> RepoResult<Vec<ProfessionalRole>> {
        let mut sql = String::from(
            "SELECT id, name, min_score, is_active
             FROM professional_roles",
        );
        if active_only {
            sql.push_str(" WHERE is_active = 1");
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut roles = Vec::new();
        while let Some(row) = rows.next()? {
            roles.push(parse_role_row(row)?);
        }
        Ok(roles)
    }

    fn insert_position(
        &self,
        title: &str,
        role_id: RoleId,
        province_id: Option<ProvinceId>,
        min_score: Option<i64>,
    ) -> RepoResult<PositionId> {
        self.conn
            .execute(
                "INSERT INTO job_positions (title, role_id, province_id, min_score)
                 VALUES (?1, ?2, ?3, ?4);",
                params![title.trim(), role_id, province_id, min_score],
            )
            .map_err(|err| map_write_error(err, "job position"))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_position(&self, id: PositionId) -> RepoResult<Option<JobPosition>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POSITION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_position_row(row)?));
        }
        Ok(None)
    }

    fn list_positions(&self, query: &PositionListQuery) -> RepoResult<Vec<JobPosition>> {
        let mut sql = format!("{POSITION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.active_only {
            sql.push_str(" AND is_active = 1");
        }
        if let Some(role_id) = query.role_id {
            sql.push_str(" AND role_id = ?");
            bind_values.push(Value::Integer(role_id));
        }
        if let Some(province_id) = query.province_id {
            sql.push_str(" AND province_id = ?");
            bind_values.push(Value::Integer(province_id));
        }

        sql.push_str(" ORDER BY title COLLATE NOCASE ASC, id ASC");
        let limit = normalize_position_limit(query.limit);
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut positions = Vec::new();
        while let Some(row) = rows.next()? {
            positions.push(parse_position_row(row)?);
        }
        Ok(positions)
    }

    fn find_compatible_positions(&self, score: i64) -> RepoResult<Vec<JobPosition>> {
        // Both the position threshold and its role threshold must admit the
        // score; NULL means no minimum on either level.
        let mut stmt = self.conn.prepare(&format!(
            "{POSITION_SELECT_SQL}
             WHERE is_active = 1
               AND (min_score IS NULL OR min_score <= ?1)
               AND EXISTS (
                   SELECT 1
                   FROM professional_roles r
                   WHERE r.id = job_positions.role_id
                     AND r.is_active = 1
                     AND (r.min_score IS NULL OR r.min_score <= ?1)
               )
             ORDER BY min_score DESC, title COLLATE NOCASE ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([score])?;
        let mut positions = Vec::new();
        while let Some(row) = rows.next()? {
            positions.push(parse_position_row(row)?);
        }
        Ok(positions)
    }

    fn deactivate_position(&self, id: PositionId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE job_positions
             SET is_active = 0, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("job position", id));
        }

        Ok(())
    }
}

/// Normalizes list limit according to the position listing contract.
pub fn normalize_position_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => POSITIONS_DEFAULT_LIMIT,
        Some(value) if value > POSITIONS_LIMIT_MAX => POSITIONS_LIMIT_MAX,
        Some(value) => value,
        None => POSITIONS_DEFAULT_LIMIT,
    }
}

fn parse_role_row(row: &Row<'_>) -> RepoResult<ProfessionalRole> {
    Ok(ProfessionalRole {
        id: row.get("id")?,
        name: row.get("name")?,
        min_score: row.get("min_score")?,
        is_active: parse_bool_column(row.get("is_active")?, "professional_roles.is_active")?,
    })
}

fn parse_position_row(row: &Row<'_>) -> RepoResult<JobPosition> {
    Ok(JobPosition {
        id: row.get("id")?,
        title: row.get("title")?,
        role_id: row.get("role_id")?,
        province_id: row.get("province_id")?,
        min_score: row.get("min_score")?,
        is_active: parse_bool_column(row.get("is_active")?, "job_positions.is_active")?,
    })
}
