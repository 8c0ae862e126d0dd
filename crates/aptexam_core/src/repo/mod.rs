//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Write paths enforce model validation before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod candidate_repo;
pub mod exam_repo;
pub mod geo_repo;
pub mod job_repo;
pub mod question_repo;
pub mod recommendation_repo;
pub mod settings_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error shared by all aggregates.
#[derive(Debug)]
pub enum RepoError {
    /// Model-level validation failure on a write path.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound {
        entity: &'static str,
        id: String,
    },
    /// A uniqueness constraint rejected the write (email, CUIL,
    /// one-exam-per-candidate).
    Conflict {
        entity: &'static str,
        message: String,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict { entity, message } => {
                write!(f, "{entity} conflicts with existing data: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Conflict { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<crate::model::candidate::CandidateValidationError> for RepoError {
    fn from(value: crate::model::candidate::CandidateValidationError) -> Self {
        Self::Validation(ValidationError::Candidate(value))
    }
}

impl From<crate::model::question::QuestionValidationError> for RepoError {
    fn from(value: crate::model::question::QuestionValidationError) -> Self {
        Self::Validation(ValidationError::Question(value))
    }
}

impl From<crate::model::recommendation::RecommendationValidationError> for RepoError {
    fn from(value: crate::model::recommendation::RecommendationValidationError) -> Self {
        Self::Validation(ValidationError::Recommendation(value))
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps constraint-violation failures on `entity` writes to
/// [`RepoError::Conflict`]; everything else stays a transport error.
pub(crate) fn map_write_error(err: rusqlite::Error, entity: &'static str) -> RepoError {
    if is_constraint_violation(&err) {
        return RepoError::Conflict {
            entity,
            message: err.to_string(),
        };
    }
    err.into()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
    )
}

pub(crate) fn parse_uuid_column(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_bool_column(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
