//! Exam repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide exam lifecycle persistence: open, answer, finalize, score.
//! - Keep correctness derivation and aggregate SQL inside the boundary.
//!
//! # Invariants
//! - One exam per candidate (UNIQUE `candidate_uuid`).
//! - Answer correctness is derived from the chosen option at write time.
//! - `finalize_exam` transitions `in_progress -> submitted` exactly once.

use crate::model::candidate::CandidateId;
use crate::model::exam::{Exam, ExamAnswer, ExamId, ExamStatus};
use crate::model::question::{OptionId, QuestionId};
use crate::repo::{map_write_error, parse_uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const EXAM_SELECT_SQL: &str = "SELECT
    uuid,
    candidate_uuid,
    status,
    total_score,
    started_at,
    submitted_at
FROM exams";

/// Exams-per-status aggregate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusExamCount {
    pub status: ExamStatus,
    pub exams: i64,
}

/// Repository interface for exam lifecycle operations.
pub trait ExamRepository {
    /// Opens one exam for a candidate and returns the stored record.
    fn create_exam(&self, candidate_uuid: CandidateId) -> RepoResult<Exam>;
    /// Gets one exam by id.
    fn get_exam(&self, id: ExamId) -> RepoResult<Option<Exam>>;
    /// Finds the exam of one candidate, if any.
    fn find_by_candidate(&self, candidate_uuid: CandidateId) -> RepoResult<Option<Exam>>;
    /// Records or replaces the answer for one question of an exam.
    fn record_answer(
        &self,
        exam_uuid: ExamId,
        question_uuid: QuestionId,
        option_uuid: Option<OptionId>,
    ) -> RepoResult<()>;
    /// Lists recorded answers of one exam.
    fn answers_for_exam(&self, exam_uuid: ExamId) -> RepoResult<Vec<ExamAnswer>>;
    /// Locks the exam and computes its correct-answer count.
    fn finalize_exam(&self, exam_uuid: ExamId) -> RepoResult<i64>;
    /// Marks a submitted exam as scored/published.
    fn mark_scored(&self, exam_uuid: ExamId) -> RepoResult<()>;
    /// Counts exams grouped by lifecycle status.
    fn count_by_status(&self) -> RepoResult<Vec<StatusExamCount>>;
}

/// SQLite-backed exam repository.
pub struct SqliteExamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExamRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ExamRepository for SqliteExamRepository<'_> {
    fn create_exam(&self, candidate_uuid: CandidateId) -> RepoResult<Exam> {
        let exam_uuid = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO exams (uuid, candidate_uuid, status)
                 VALUES (?1, ?2, ?3);",
                params![
                    exam_uuid.to_string(),
                    candidate_uuid.to_string(),
                    status_to_db(ExamStatus::InProgress),
                ],
            )
            .map_err(|err| map_write_error(err, "exam"))?;

        load_required_exam(self.conn, exam_uuid)
    }

    fn get_exam(&self, id: ExamId) -> RepoResult<Option<Exam>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXAM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_exam_row(row)?));
        }
        Ok(None)
    }

    fn find_by_candidate(&self, candidate_uuid: CandidateId) -> RepoResult<Option<Exam>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXAM_SELECT_SQL} WHERE candidate_uuid = ?1;"))?;
        let mut rows = stmt.query([candidate_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_exam_row(row)?));
        }
        Ok(None)
    }

    fn record_answer(
        &self,
        exam_uuid: ExamId,
        question_uuid: QuestionId,
        option_uuid: Option<OptionId>,
    ) -> RepoResult<()> {
        if !exam_exists(self.conn, exam_uuid)? {
            return Err(RepoError::not_found("exam", exam_uuid));
        }

        // A chosen option must belong to the answered question.
        let is_correct = match option_uuid {
            Some(option) => {
                let correct: Option<i64> = self
                    .conn
                    .query_row(
                        "SELECT is_correct FROM options
                         WHERE uuid = ?1 AND question_uuid = ?2;",
                        params![option.to_string(), question_uuid.to_string()],
                        |row| row.get(0),
                    )
                    .optional()?;
                match correct {
                    Some(value) => value,
                    None => return Err(RepoError::not_found("option", option)),
                }
            }
            None => 0,
        };

        self.conn
            .execute(
                "INSERT INTO exam_answers (
                    uuid,
                    exam_uuid,
                    question_uuid,
                    option_uuid,
                    is_correct
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (exam_uuid, question_uuid) DO UPDATE SET
                    option_uuid = excluded.option_uuid,
                    is_correct = excluded.is_correct,
                    answered_at = (strftime('%s', 'now') * 1000);",
                params![
                    Uuid::new_v4().to_string(),
                    exam_uuid.to_string(),
                    question_uuid.to_string(),
                    option_uuid.map(|value| value.to_string()),
                    is_correct,
                ],
            )
            .map_err(|err| map_write_error(err, "exam answer"))?;

        Ok(())
    }

    fn answers_for_exam(&self, exam_uuid: ExamId) -> RepoResult<Vec<ExamAnswer>> {
        let mut stmt = self.conn.prepare(
            "SELECT exam_uuid, question_uuid, option_uuid, is_correct, answered_at
             FROM exam_answers
             WHERE exam_uuid = ?1
             ORDER BY answered_at ASC, question_uuid ASC;",
        )?;
        let mut rows = stmt.query([exam_uuid.to_string()])?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next()? {
            answers.push(parse_answer_row(row)?);
        }
        Ok(answers)
    }

    fn finalize_exam(&self, exam_uuid: ExamId) -> RepoResult<i64> {
        let changed = self.conn.execute(
            "UPDATE exams
             SET
                status = 'submitted',
                total_score = (
                    SELECT COUNT(*)
                    FROM exam_answers
                    WHERE exam_uuid = ?1 AND is_correct = 1
                ),
                submitted_at = (strftime('%s', 'now') * 1000),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND status = 'in_progress';",
            [exam_uuid.to_string()],
        )?;

        if changed == 0 {
            if exam_exists(self.conn, exam_uuid)? {
                return Err(RepoError::Conflict {
                    entity: "exam",
                    message: format!("exam {exam_uuid} was already finalized"),
                });
            }
            return Err(RepoError::not_found("exam", exam_uuid));
        }

        let exam = load_required_exam(self.conn, exam_uuid)?;
        exam.total_score.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "exam {exam_uuid} finalized without a total_score"
            ))
        })
    }

    fn mark_scored(&self, exam_uuid: ExamId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE exams
             SET
                status = 'scored',
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND status = 'submitted';",
            [exam_uuid.to_string()],
        )?;

        if changed == 0 {
            if exam_exists(self.conn, exam_uuid)? {
                return Err(RepoError::Conflict {
                    entity: "exam",
                    message: format!("exam {exam_uuid} is not in submitted state"),
                });
            }
            return Err(RepoError::not_found("exam", exam_uuid));
        }

        Ok(())
    }

    fn count_by_status(&self) -> RepoResult<Vec<StatusExamCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) AS exams
             FROM exams
             GROUP BY status
             ORDER BY status ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let status_text: String = row.get("status")?;
            let status = parse_status(&status_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid status `{status_text}` in exams.status"))
            })?;
            counts.push(StatusExamCount {
                status,
                exams: row.get("exams")?,
            });
        }
        Ok(counts)
    }
}

pub(crate) fn status_to_db(status: ExamStatus) -> &'static str {
    match status {
        ExamStatus::InProgress => "in_progress",
        ExamStatus::Submitted => "submitted",
        ExamStatus::Scored => "scored",
    }
}

pub(crate) fn parse_status(value: &str) -> Option<ExamStatus> {
    match value {
        "in_progress" => Some(ExamStatus::InProgress),
        "submitted" => Some(ExamStatus::Submitted),
        "scored" => Some(ExamStatus::Scored),
        _ => None,
    }
}

fn exam_exists(conn: &Connection, exam_uuid: ExamId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM exams WHERE uuid = ?1);",
        [exam_uuid.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_required_exam(conn: &Connection, exam_uuid: ExamId) -> RepoResult<Exam> {
    let mut stmt = conn.prepare(&format!("{EXAM_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([exam_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_exam_row(row);
    }
    Err(RepoError::not_found("exam", exam_uuid))
}

fn parse_exam_row(row: &Row<'_>) -> RepoResult<Exam> {
    let uuid_text: String = row.get("uuid")?;
    let candidate_text: String = row.get("candidate_uuid")?;
    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in exams.status"))
    })?;

    Ok(Exam {
        uuid: parse_uuid_column(&uuid_text, "exams.uuid")?,
        candidate_uuid: parse_uuid_column(&candidate_text, "exams.candidate_uuid")?,
        status,
        total_score: row.get("total_score")?,
        started_at: row.get("started_at")?,
        submitted_at: row.get("submitted_at")?,
    })
}

fn parse_answer_row(row: &Row<'_>) -> RepoResult<ExamAnswer> {
    let exam_text: String = row.get("exam_uuid")?;
    let question_text: String = row.get("question_uuid")?;
    let option_uuid = match row.get::<_, Option<String>>("option_uuid")? {
        Some(value) => Some(parse_uuid_column(&value, "exam_answers.option_uuid")?),
        None => None,
    };

    Ok(ExamAnswer {
        exam_uuid: parse_uuid_column(&exam_text, "exam_answers.exam_uuid")?,
        question_uuid: parse_uuid_column(&question_text, "exam_answers.question_uuid")?,
        option_uuid,
        is_correct: crate::repo::parse_bool_column(
            row.get("is_correct")?,
            "exam_answers.is_correct",
        )?,
        answered_at: row.get("answered_at")?,
    })
}
