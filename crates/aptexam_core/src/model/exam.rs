//! Exam domain model.
//!
//! # Invariants
//! - One exam per candidate (schema-enforced UNIQUE on `candidate_uuid`).
//! - `total_score` is populated when the exam leaves `in_progress`.
//! - Status only moves forward: `in_progress -> submitted -> scored`.

use crate::model::candidate::CandidateId;
use crate::model::question::{OptionId, QuestionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for exams.
pub type ExamId = Uuid;

/// Exam lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    /// Candidate is still answering.
    InProgress,
    /// Answers locked in, correct count computed.
    Submitted,
    /// Reviewed/published result.
    Scored,
}

/// Exam read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub uuid: ExamId,
    pub candidate_uuid: CandidateId,
    pub status: ExamStatus,
    /// Count of correctly answered questions. `None` while in progress.
    pub total_score: Option<i64>,
    /// Epoch ms when the exam was opened.
    pub started_at: i64,
    /// Epoch ms when the exam was submitted. `None` while in progress.
    pub submitted_at: Option<i64>,
}

/// One recorded answer inside an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAnswer {
    pub exam_uuid: ExamId,
    pub question_uuid: QuestionId,
    /// Chosen option. `None` models an explicitly skipped question.
    pub option_uuid: Option<OptionId>,
    pub is_correct: bool,
    /// Epoch ms of the last answer write for this question.
    pub answered_at: i64,
}

#[cfg(test)]
mod tests {
    use super::ExamStatus;

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&ExamStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: ExamStatus = serde_json::from_str("\"scored\"").unwrap();
        assert_eq!(parsed, ExamStatus::Scored);
    }
}
