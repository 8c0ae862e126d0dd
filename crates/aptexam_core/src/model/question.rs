//! Question bank domain model.
//!
//! # Invariants
//! - Every question belongs to exactly one knowledge area.
//! - Inactive questions stay in storage for historical answers but are
//!   excluded from sampling.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for questions.
pub type QuestionId = Uuid;
/// Stable identifier for answer options.
pub type OptionId = Uuid;

/// Knowledge area an exam question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeArea {
    Logic,
    Verbal,
    Numerical,
    Technical,
}

impl KnowledgeArea {
    /// All areas in stable order, used when assembling a full exam.
    pub const ALL: [KnowledgeArea; 4] = [
        KnowledgeArea::Logic,
        KnowledgeArea::Verbal,
        KnowledgeArea::Numerical,
        KnowledgeArea::Technical,
    ];
}

/// Validation failures for question write paths.
#[derive(Debug)]
pub enum QuestionValidationError {
    /// Question prompt is blank.
    BlankPrompt,
    /// Option label is blank.
    BlankOptionLabel,
}

impl Display for QuestionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankPrompt => write!(f, "question prompt cannot be blank"),
            Self::BlankOptionLabel => write!(f, "option label cannot be blank"),
        }
    }
}

impl Error for QuestionValidationError {}

/// Canonical question record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub uuid: QuestionId,
    pub area: KnowledgeArea,
    pub prompt: String,
    pub is_active: bool,
}

impl Question {
    /// Creates an active question with a generated stable ID.
    pub fn new(area: KnowledgeArea, prompt: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            area,
            prompt: prompt.into(),
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), QuestionValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionValidationError::BlankPrompt);
        }
        Ok(())
    }
}

/// One selectable answer for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub uuid: OptionId,
    pub question_uuid: QuestionId,
    pub label: String,
    pub is_correct: bool,
    /// Stable display order inside the question.
    pub sort_order: i64,
}

impl AnswerOption {
    /// Creates an option with a generated stable ID.
    pub fn new(
        question_uuid: QuestionId,
        label: impl Into<String>,
        is_correct: bool,
        sort_order: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            question_uuid,
            label: label.into(),
            is_correct,
            sort_order,
        }
    }

    pub fn validate(&self) -> Result<(), QuestionValidationError> {
        if self.label.trim().is_empty() {
            return Err(QuestionValidationError::BlankOptionLabel);
        }
        Ok(())
    }
}
