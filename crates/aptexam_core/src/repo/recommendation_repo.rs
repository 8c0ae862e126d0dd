//! Study recommendation repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist recommendations and their N-N links to job positions.
//! - Record audit rows for rejected recommendation saves.
//!
//! # Invariants
//! - `insert_with_positions` commits the recommendation and its links
//!   together; a failed link leaves no recommendation row.
//! - `set_positions` replaces the whole link set in a single transaction.
//! - Linked position ids are returned sorted ascending.

use crate::model::job::PositionId;
use crate::model::recommendation::{RecommendationDraft, RecommendationId, StudyRecommendation};
use crate::model::settings::FailedRecommendationAttempt;
use crate::repo::{map_write_error, parse_bool_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Repository interface for study recommendations.
pub trait RecommendationRepository {
    /// Inserts one recommendation and returns its row id.
    fn insert_recommendation(&self, draft: &RecommendationDraft) -> RepoResult<RecommendationId>;
    /// Inserts one recommendation together with its position links in a
    /// single transaction. A failed link leaves no recommendation row.
    fn insert_with_positions(
        &mut self,
        draft: &RecommendationDraft,
        position_ids: &[PositionId],
    ) -> RepoResult<RecommendationId>;
    /// Gets one recommendation with its linked position ids.
    fn get_recommendation(
        &self,
        id: RecommendationId,
    ) -> RepoResult<Option<StudyRecommendation>>;
    /// Replaces all position links of one recommendation atomically.
    fn set_positions(
        &mut self,
        id: RecommendationId,
        position_ids: &[PositionId],
    ) -> RepoResult<()>;
    /// Lists active recommendations linked to one position.
    fn list_for_position(&self, position_id: PositionId) -> RepoResult<Vec<StudyRecommendation>>;
    /// Records one audit row for a rejected recommendation save.
    fn record_failed_attempt(
        &self,
        draft: &RecommendationDraft,
        error: &str,
    ) -> RepoResult<i64>;
    /// Lists the most recent audit rows, newest first.
    fn list_failed_attempts(&self, limit: u32) -> RepoResult<Vec<FailedRecommendationAttempt>>;
}

/// SQLite-backed recommendation repository.
///
/// Holds a mutable connection borrow because link replacement runs inside an
/// IMMEDIATE transaction.
pub struct SqliteRecommendationRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecommendationRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl RecommendationRepository for SqliteRecommendationRepository<'_> {
    fn insert_recommendation(&self, draft: &RecommendationDraft) -> RepoResult<RecommendationId> {
        draft.validate()?;

        self.conn
            .execute(
                "INSERT INTO study_recommendations (title, institution, url)
                 VALUES (?1, ?2, ?3);",
                params![
                    draft.title.trim(),
                    draft.institution.trim(),
                    draft.url.as_deref(),
                ],
            )
            .map_err(|err| map_write_error(err, "study recommendation"))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_with_positions(
        &mut self,
        draft: &RecommendationDraft,
        position_ids: &[PositionId],
    ) -> RepoResult<RecommendationId> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO study_recommendations (title, institution, url)
             VALUES (?1, ?2, ?3);",
            params![
                draft.title.trim(),
                draft.institution.trim(),
                draft.url.as_deref(),
            ],
        )
        .map_err(|err| map_write_error(err, "study recommendation"))?;
        let id = tx.last_insert_rowid();

        for position_id in position_ids {
            tx.execute(
                "INSERT OR IGNORE INTO recommendation_positions (recommendation_id, position_id)
                 VALUES (?1, ?2);",
                params![id, position_id],
            )
            .map_err(|err| map_write_error(err, "recommendation position link"))?;
        }

        tx.commit()?;
        Ok(id)
    }

    fn get_recommendation(
        &self,
        id: RecommendationId,
    ) -> RepoResult<Option<StudyRecommendation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, institution, url, is_active
             FROM study_recommendations
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let mut recommendation = parse_recommendation_row(row)?;
            recommendation.position_ids = load_position_links(self.conn, id)?;
            return Ok(Some(recommendation));
        }
        Ok(None)
    }

    fn set_positions(
        &mut self,
        id: RecommendationId,
        position_ids: &[PositionId],
    ) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !recommendation_exists_in_tx(&tx, id)? {
            return Err(RepoError::not_found("study recommendation", id));
        }

        tx.execute(
            "DELETE FROM recommendation_positions WHERE recommendation_id = ?1;",
            [id],
        )?;

        for position_id in position_ids {
            tx.execute(
                "INSERT OR IGNORE INTO recommendation_positions (recommendation_id, position_id)
                 VALUES (?1, ?2);",
                params![id, position_id],
            )
            .map_err(|err| map_write_error(err, "recommendation position link"))?;
        }

        tx.commit()?;
        Ok(())
    }

    fn list_for_position(&self, position_id: PositionId) -> RepoResult<Vec<StudyRecommendation>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.title, r.institution, r.url, r.is_active
             FROM study_recommendations r
             INNER JOIN recommendation_positions rp ON rp.recommendation_id = r.id
             WHERE rp.position_id = ?1
               AND r.is_active = 1
             ORDER BY r.title COLLATE NOCASE ASC, r.id ASC;",
        )?;
        let mut rows = stmt.query([position_id])?;
        let mut recommendations = Vec::new();
        while let Some(row) = rows.next()? {
            recommendations.push(parse_recommendation_row(row)?);
        }

        for recommendation in &mut recommendations {
            recommendation.position_ids = load_position_links(self.conn, recommendation.id)?;
        }
        Ok(recommendations)
    }

    fn record_failed_attempt(
        &self,
        draft: &RecommendationDraft,
        error: &str,
    ) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO failed_recommendation_attempts (title, institution, error)
             VALUES (?1, ?2, ?3);",
            params![draft.title.as_str(), draft.institution.as_str(), error],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_failed_attempts(&self, limit: u32) -> RepoResult<Vec<FailedRecommendationAttempt>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, institution, error, attempted_at
             FROM failed_recommendation_attempts
             ORDER BY attempted_at DESC, id DESC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut attempts = Vec::new();
        while let Some(row) = rows.next()? {
            attempts.push(FailedRecommendationAttempt {
                id: row.get("id")?,
                title: row.get("title")?,
                institution: row.get("institution")?,
                error: row.get("error")?,
                attempted_at: row.get("attempted_at")?,
            });
        }
        Ok(attempts)
    }
}

fn parse_recommendation_row(row: &Row<'_>) -> RepoResult<StudyRecommendation> {
    Ok(StudyRecommendation {
        id: row.get("id")?,
        title: row.get("title")?,
        institution: row.get("institution")?,
        url: row.get("url")?,
        is_active: parse_bool_column(row.get("is_active")?, "study_recommendations.is_active")?,
        position_ids: Vec::new(),
    })
}

fn load_position_links(conn: &Connection, id: RecommendationId) -> RepoResult<Vec<PositionId>> {
    let mut stmt = conn.prepare(
        "SELECT position_id
         FROM recommendation_positions
         WHERE recommendation_id = ?1
         ORDER BY position_id ASC;",
    )?;
    let mut rows = stmt.query([id])?;
    let mut position_ids = Vec::new();
    while let Some(row) = rows.next()? {
        position_ids.push(row.get(0)?);
    }
    Ok(position_ids)
}

fn recommendation_exists_in_tx(tx: &Transaction<'_>, id: RecommendationId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM study_recommendations WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
