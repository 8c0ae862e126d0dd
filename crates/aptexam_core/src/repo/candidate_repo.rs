//! Candidate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide candidate CRUD plus identity lookups (email, CUIL).
//! - Keep pagination and aggregate SQL inside the repository boundary.
//!
//! # Invariants
//! - Write paths call `Candidate::validate()` before SQL mutations.
//! - CUIL values are persisted normalized (11 bare digits).
//! - List ordering is deterministic: `last_name, first_name, uuid`.

use crate::model::candidate::{normalize_cuil, Candidate, CandidateId};
use crate::repo::{
    map_write_error, parse_uuid_column, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CANDIDATES_DEFAULT_LIMIT: u32 = 20;
const CANDIDATES_LIMIT_MAX: u32 = 100;

const CANDIDATE_SELECT_SQL: &str = "SELECT
    uuid,
    first_name,
    last_name,
    email,
    cuil,
    locality_id
FROM candidates";

/// Candidates-per-province aggregate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceCandidateCount {
    pub province_id: i64,
    pub province_name: String,
    pub candidates: i64,
}

/// Query options for candidate listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateListQuery {
    /// Optional locality filter.
    pub locality_id: Option<i64>,
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Repository interface for candidate operations.
pub trait CandidateRepository {
    /// Creates one candidate and returns its stable id.
    fn create_candidate(&self, candidate: &Candidate) -> RepoResult<CandidateId>;
    /// Replaces all mutable candidate fields.
    fn update_candidate(&self, candidate: &Candidate) -> RepoResult<()>;
    /// Gets one candidate by id.
    fn get_candidate(&self, id: CandidateId) -> RepoResult<Option<Candidate>>;
    /// Finds one candidate by email, case-insensitively.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Candidate>>;
    /// Finds one candidate by CUIL in any accepted input format.
    fn find_by_cuil(&self, cuil: &str) -> RepoResult<Option<Candidate>>;
    /// Returns whether any candidate uses the given email.
    fn email_exists(&self, email: &str) -> RepoResult<bool>;
    /// Returns whether any candidate uses the given CUIL.
    fn cuil_exists(&self, cuil: &str) -> RepoResult<bool>;
    /// Lists candidates using optional locality filter + pagination.
    fn list_candidates(&self, query: &CandidateListQuery) -> RepoResult<Vec<Candidate>>;
    /// Counts candidates grouped by province of their locality.
    fn count_by_province(&self) -> RepoResult<Vec<ProvinceCandidateCount>>;
}

/// SQLite-backed candidate repository.
pub struct SqliteCandidateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCandidateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CandidateRepository for SqliteCandidateRepository<'_> {
    fn create_candidate(&self, candidate: &Candidate) -> RepoResult<CandidateId> {
        candidate.validate()?;
        let cuil = normalized_cuil_for_write(candidate)?;

        self.conn
            .execute(
                "INSERT INTO candidates (
                    uuid,
                    first_name,
                    last_name,
                    email,
                    cuil,
                    locality_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    candidate.uuid.to_string(),
                    candidate.first_name.as_str(),
                    candidate.last_name.as_str(),
                    candidate.email.trim(),
                    cuil,
                    candidate.locality_id,
                ],
            )
            .map_err(|err| map_write_error(err, "candidate"))?;

        Ok(candidate.uuid)
    }

    fn update_candidate(&self, candidate: &Candidate) -> RepoResult<()> {
        candidate.validate()?;
        let cuil = normalized_cuil_for_write(candidate)?;

        let changed = self
            .conn
            .execute(
                "UPDATE candidates
                 SET
                    first_name = ?1,
                    last_name = ?2,
                    email = ?3,
                    cuil = ?4,
                    locality_id = ?5,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?6;",
                params![
                    candidate.first_name.as_str(),
                    candidate.last_name.as_str(),
                    candidate.email.trim(),
                    cuil,
                    candidate.locality_id,
                    candidate.uuid.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, "candidate"))?;

        if changed == 0 {
            return Err(RepoError::not_found("candidate", candidate.uuid));
        }

        Ok(())
    }

    fn get_candidate(&self, id: CandidateId) -> RepoResult<Option<Candidate>> {
        fetch_one(
            self.conn,
            &format!("{CANDIDATE_SELECT_SQL} WHERE uuid = ?1;"),
            &id.to_string(),
        )
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Candidate>> {
        fetch_one(
            self.conn,
            &format!("{CANDIDATE_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"),
            email.trim(),
        )
    }

    fn find_by_cuil(&self, cuil: &str) -> RepoResult<Option<Candidate>> {
        // Malformed lookup input cannot match any stored normalized CUIL.
        let Some(normalized) = normalize_cuil(cuil) else {
            return Ok(None);
        };
        fetch_one(
            self.conn,
            &format!("{CANDIDATE_SELECT_SQL} WHERE cuil = ?1;"),
            &normalized,
        )
    }

    fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM candidates WHERE email = ?1 COLLATE NOCASE
            );",
            [email.trim()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn cuil_exists(&self, cuil: &str) -> RepoResult<bool> {
        let Some(normalized) = normalize_cuil(cuil) else {
            return Ok(false);
        };
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM candidates WHERE cuil = ?1);",
            [normalized.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_candidates(&self, query: &CandidateListQuery) -> RepoResult<Vec<Candidate>> {
        let mut sql = format!("{CANDIDATE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(locality_id) = query.locality_id {
            sql.push_str(" AND locality_id = ?");
            bind_values.push(Value::Integer(locality_id));
        }

        sql.push_str(" ORDER BY last_name ASC, first_name ASC, uuid ASC");
        let limit = normalize_candidate_limit(query.limit);
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut candidates = Vec::new();
        while let Some(row) = rows.next()? {
            candidates.push(parse_candidate_row(row)?);
        }

        Ok(candidates)
    }

    fn count_by_province(&self) -> RepoResult<Vec<ProvinceCandidateCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.id AS province_id,
                p.name AS province_name,
                COUNT(c.uuid) AS candidates
             FROM candidates c
             INNER JOIN localities l ON l.id = c.locality_id
             INNER JOIN provinces p ON p.id = l.province_id
             GROUP BY p.id, p.name
             ORDER BY candidates DESC, p.name COLLATE NOCASE ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            counts.push(ProvinceCandidateCount {
                province_id: row.get("province_id")?,
                province_name: row.get("province_name")?,
                candidates: row.get("candidates")?,
            });
        }

        Ok(counts)
    }
}

/// Normalizes list limit according to the candidate listing contract.
pub fn normalize_candidate_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => CANDIDATES_DEFAULT_LIMIT,
        Some(value) if value > CANDIDATES_LIMIT_MAX => CANDIDATES_LIMIT_MAX,
        Some(value) => value,
        None => CANDIDATES_DEFAULT_LIMIT,
    }
}

fn normalized_cuil_for_write(candidate: &Candidate) -> RepoResult<String> {
    normalize_cuil(&candidate.cuil).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "CUIL `{}` passed validation but failed normalization",
            candidate.cuil
        ))
    })
}

fn fetch_one(conn: &Connection, sql: &str, bind: &str) -> RepoResult<Option<Candidate>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([bind])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_candidate_row(row)?));
    }
    Ok(None)
}

fn parse_candidate_row(row: &Row<'_>) -> RepoResult<Candidate> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Candidate {
        uuid: parse_uuid_column(&uuid_text, "candidates.uuid")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        cuil: row.get("cuil")?,
        locality_id: row.get("locality_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::normalize_candidate_limit;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(normalize_candidate_limit(None), 20);
        assert_eq!(normalize_candidate_limit(Some(0)), 20);
        assert_eq!(normalize_candidate_limit(Some(35)), 35);
        assert_eq!(normalize_candidate_limit(Some(1000)), 100);
    }
}
