//! Question bank repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide question/option CRUD and per-area sampling for exam assembly.
//!
//! # Invariants
//! - Sampling only draws active questions of the requested area.
//! - Option listing is deterministic: `sort_order ASC, uuid ASC`.

use crate::model::question::{AnswerOption, KnowledgeArea, OptionId, Question, QuestionId};
use crate::repo::{bool_to_int, map_write_error, parse_bool_column, parse_uuid_column, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const QUESTION_SELECT_SQL: &str = "SELECT
    uuid,
    area,
    prompt,
    is_active
FROM questions";

/// Questions-per-area aggregate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaQuestionCount {
    pub area: KnowledgeArea,
    pub questions: i64,
}

/// Repository interface for the question bank.
pub trait QuestionRepository {
    /// Creates one question and returns its stable id.
    fn create_question(&self, question: &Question) -> RepoResult<QuestionId>;
    /// Creates one answer option for an existing question.
    fn create_option(&self, option: &AnswerOption) -> RepoResult<OptionId>;
    /// Gets one question by id.
    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>>;
    /// Lists questions of one area.
    fn list_by_area(&self, area: KnowledgeArea, active_only: bool) -> RepoResult<Vec<Question>>;
    /// Lists options of one question in display order.
    fn options_for_question(&self, question_id: QuestionId) -> RepoResult<Vec<AnswerOption>>;
    /// Draws up to `count` random active questions of one area.
    fn sample_for_area(&self, area: KnowledgeArea, count: u32) -> RepoResult<Vec<Question>>;
    /// Counts active questions grouped by area.
    fn count_by_area(&self) -> RepoResult<Vec<AreaQuestionCount>>;
    /// Retires one question from future sampling.
    fn deactivate_question(&self, id: QuestionId) -> RepoResult<()>;
}

/// SQLite-backed question bank repository.
pub struct SqliteQuestionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuestionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl QuestionRepository for SqliteQuestionRepository<'_> {
    fn create_question(&self, question: &Question) -> RepoResult<QuestionId> {
        question.validate()?;

        self.conn
            .execute(
                "INSERT INTO questions (uuid, area, prompt, is_active)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    question.uuid.to_string(),
                    area_to_db(question.area),
                    question.prompt.as_str(),
                    bool_to_int(question.is_active),
                ],
            )
            .map_err(|err| map_write_error(err, "question"))?;

        Ok(question.uuid)
    }

    fn create_option(&self, option: &AnswerOption) -> RepoResult<OptionId> {
        option.validate()?;

        self.conn
            .execute(
                "INSERT INTO options (uuid, question_uuid, label, is_correct, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    option.uuid.to_string(),
                    option.question_uuid.to_string(),
                    option.label.as_str(),
                    bool_to_int(option.is_correct),
                    option.sort_order,
                ],
            )
            .map_err(|err| map_write_error(err, "option"))?;

        Ok(option.uuid)
    }

    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUESTION_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_question_row(row)?));
        }
        Ok(None)
    }

    fn list_by_area(&self, area: KnowledgeArea, active_only: bool) -> RepoResult<Vec<Question>> {
        let mut sql = format!("{QUESTION_SELECT_SQL} WHERE area = ?");
        let bind_values: Vec<Value> = vec![Value::Text(area_to_db(area).to_string())];

        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }
        Ok(questions)
    }

    fn options_for_question(&self, question_id: QuestionId) -> RepoResult<Vec<AnswerOption>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, question_uuid, label, is_correct, sort_order
             FROM options
             WHERE question_uuid = ?1
             ORDER BY sort_order ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([question_id.to_string()])?;
        let mut options = Vec::new();
        while let Some(row) = rows.next()? {
            options.push(parse_option_row(row)?);
        }
        Ok(options)
    }

    fn sample_for_area(&self, area: KnowledgeArea, count: u32) -> RepoResult<Vec<Question>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{QUESTION_SELECT_SQL}
             WHERE area = ?1
               AND is_active = 1
             ORDER BY RANDOM()
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![area_to_db(area), i64::from(count)])?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }
        Ok(questions)
    }

    fn count_by_area(&self) -> RepoResult<Vec<AreaQuestionCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT area, COUNT(*) AS questions
             FROM questions
             WHERE is_active = 1
             GROUP BY area
             ORDER BY area ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let area_text: String = row.get("area")?;
            let area = parse_area(&area_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid area `{area_text}` in questions.area"))
            })?;
            counts.push(AreaQuestionCount {
                area,
                questions: row.get("questions")?,
            });
        }
        Ok(counts)
    }

    fn deactivate_question(&self, id: QuestionId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE questions SET is_active = 0 WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("question", id));
        }

        Ok(())
    }
}

pub(crate) fn area_to_db(area: KnowledgeArea) -> &'static str {
    match area {
        KnowledgeArea::Logic => "logic",
        KnowledgeArea::Verbal => "verbal",
        KnowledgeArea::Numerical => "numerical",
        KnowledgeArea::Technical => "technical",
    }
}

pub(crate) fn parse_area(value: &str) -> Option<KnowledgeArea> {
    match value {
        "logic" => Some(KnowledgeArea::Logic),
        "verbal" => Some(KnowledgeArea::Verbal),
        "numerical" => Some(KnowledgeArea::Numerical),
        "technical" => Some(KnowledgeArea::Technical),
        _ => None,
    }
}

fn parse_question_row(row: &Row<'_>) -> RepoResult<Question> {
    let uuid_text: String = row.get("uuid")?;
    let area_text: String = row.get("area")?;
    let area = parse_area(&area_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid area `{area_text}` in questions.area"))
    })?;

    Ok(Question {
        uuid: parse_uuid_column(&uuid_text, "questions.uuid")?,
        area,
        prompt: row.get("prompt")?,
        is_active: parse_bool_column(row.get("is_active")?, "questions.is_active")?,
    })
}

fn parse_option_row(row: &Row<'_>) -> RepoResult<AnswerOption> {
    let uuid_text: String = row.get("uuid")?;
    let question_text: String = row.get("question_uuid")?;

    Ok(AnswerOption {
        uuid: parse_uuid_column(&uuid_text, "options.uuid")?,
        question_uuid: parse_uuid_column(&question_text, "options.question_uuid")?,
        label: row.get("label")?,
        is_correct: parse_bool_column(row.get("is_correct")?, "options.is_correct")?,
        sort_order: row.get("sort_order")?,
    })
}
