//! Exam use-case service.
//!
//! # Responsibility
//! - Open exams with per-area random question sampling.
//! - Guard answer/submit transitions against the exam lifecycle.
//!
//! # Invariants
//! - A candidate can hold at most one exam.
//! - Answers are only accepted while the exam is `in_progress`.
//! - Submit computes the correct count exactly once.

use crate::model::candidate::CandidateId;
use crate::model::exam::{Exam, ExamId, ExamStatus};
use crate::model::question::{KnowledgeArea, OptionId, Question, QuestionId};
use crate::repo::exam_repo::{ExamRepository, StatusExamCount};
use crate::repo::question_repo::QuestionRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for exam use-cases.
#[derive(Debug)]
pub enum ExamServiceError {
    /// Candidate already holds an exam.
    ExamAlreadyExists(CandidateId),
    /// Target exam does not exist.
    ExamNotFound(ExamId),
    /// Exam is no longer accepting answers.
    ExamNotEditable(ExamId),
    /// No active questions were available for any requested area.
    EmptyQuestionBank,
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ExamServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExamAlreadyExists(candidate) => {
                write!(f, "candidate {candidate} already has an exam")
            }
            Self::ExamNotFound(exam) => write!(f, "exam not found: {exam}"),
            Self::ExamNotEditable(exam) => write!(f, "exam is not accepting answers: {exam}"),
            Self::EmptyQuestionBank => write!(f, "question bank has no active questions"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent exam state: {details}"),
        }
    }
}

impl Error for ExamServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ExamServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// A freshly opened exam with its sampled question set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSession {
    pub exam: Exam,
    /// Sampled questions grouped in `KnowledgeArea::ALL` order.
    pub questions: Vec<Question>,
}

/// Exam service facade over exam and question repositories.
pub struct ExamService<E: ExamRepository, Q: QuestionRepository> {
    exams: E,
    questions: Q,
}

impl<E: ExamRepository, Q: QuestionRepository> ExamService<E, Q> {
    /// Creates a service using the provided repository implementations.
    pub fn new(exams: E, questions: Q) -> Self {
        Self { exams, questions }
    }

    /// Opens one exam for a candidate, sampling `questions_per_area` active
    /// questions from every knowledge area.
    ///
    /// Areas with a smaller pool contribute fewer questions; an entirely
    /// empty bank is rejected.
    pub fn start_exam(
        &self,
        candidate_uuid: CandidateId,
        questions_per_area: u32,
    ) -> Result<ExamSession, ExamServiceError> {
        if self.exams.find_by_candidate(candidate_uuid)?.is_some() {
            return Err(ExamServiceError::ExamAlreadyExists(candidate_uuid));
        }

        let mut sampled = Vec::new();
        for area in KnowledgeArea::ALL {
            sampled.extend(self.questions.sample_for_area(area, questions_per_area)?);
        }
        if sampled.is_empty() {
            return Err(ExamServiceError::EmptyQuestionBank);
        }

        let exam = self.exams.create_exam(candidate_uuid)?;
        info!(
            "event=exam_started module=service status=ok exam={} candidate={} questions={}",
            exam.uuid,
            candidate_uuid,
            sampled.len()
        );

        Ok(ExamSession {
            exam,
            questions: sampled,
        })
    }

    /// Records or replaces one answer on an in-progress exam.
    pub fn answer(
        &self,
        exam_uuid: ExamId,
        question_uuid: QuestionId,
        option_uuid: Option<OptionId>,
    ) -> Result<(), ExamServiceError> {
        let exam = self
            .exams
            .get_exam(exam_uuid)?
            .ok_or(ExamServiceError::ExamNotFound(exam_uuid))?;
        if exam.status != ExamStatus::InProgress {
            return Err(ExamServiceError::ExamNotEditable(exam_uuid));
        }

        self.exams
            .record_answer(exam_uuid, question_uuid, option_uuid)?;
        Ok(())
    }

    /// Locks the exam, computes its score and returns the stored record.
    pub fn submit(&self, exam_uuid: ExamId) -> Result<Exam, ExamServiceError> {
        let exam = self
            .exams
            .get_exam(exam_uuid)?
            .ok_or(ExamServiceError::ExamNotFound(exam_uuid))?;
        if exam.status != ExamStatus::InProgress {
            return Err(ExamServiceError::ExamNotEditable(exam_uuid));
        }

        let total_score = self.exams.finalize_exam(exam_uuid)?;
        info!(
            "event=exam_submitted module=service status=ok exam={exam_uuid} total_score={total_score}"
        );

        self.exams
            .get_exam(exam_uuid)?
            .ok_or(ExamServiceError::InconsistentState(
                "submitted exam not found in read-back",
            ))
    }

    /// Gets one exam by id.
    pub fn get_exam(&self, exam_uuid: ExamId) -> RepoResult<Option<Exam>> {
        self.exams.get_exam(exam_uuid)
    }

    /// Counts exams grouped by lifecycle status.
    pub fn status_breakdown(&self) -> RepoResult<Vec<StatusExamCount>> {
        self.exams.count_by_status()
    }
}
