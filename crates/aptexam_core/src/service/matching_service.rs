//! Candidate-to-position matching service.
//!
//! # Responsibility
//! - Resolve a candidate's exam score and return threshold-compatible
//!   positions.
//!
//! # Invariants
//! - Matching only considers submitted or scored exams.
//! - Threshold comparison happens entirely in SQL (`find_compatible_positions`).

use crate::model::candidate::CandidateId;
use crate::model::exam::{ExamId, ExamStatus};
use crate::model::job::JobPosition;
use crate::repo::exam_repo::ExamRepository;
use crate::repo::job_repo::JobRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for matching use-cases.
#[derive(Debug)]
pub enum MatchingServiceError {
    /// Candidate never opened an exam.
    NoExamForCandidate(CandidateId),
    /// Exam exists but was not submitted yet.
    ExamNotSubmitted(ExamId),
    /// Exam left `in_progress` without a stored score.
    MissingScore(ExamId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for MatchingServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoExamForCandidate(candidate) => {
                write!(f, "candidate {candidate} has no exam")
            }
            Self::ExamNotSubmitted(exam) => {
                write!(f, "exam {exam} has not been submitted yet")
            }
            Self::MissingScore(exam) => write!(f, "exam {exam} has no stored score"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MatchingServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MatchingServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Matching service facade over exam and job repositories.
pub struct MatchingService<E: ExamRepository, J: JobRepository> {
    exams: E,
    jobs: J,
}

impl<E: ExamRepository, J: JobRepository> MatchingService<E, J> {
    /// Creates a service using the provided repository implementations.
    pub fn new(exams: E, jobs: J) -> Self {
        Self { exams, jobs }
    }

    /// Returns active positions whose thresholds admit the candidate's
    /// submitted exam score.
    pub fn positions_for_candidate(
        &self,
        candidate_uuid: CandidateId,
    ) -> Result<Vec<JobPosition>, MatchingServiceError> {
        let exam = self
            .exams
            .find_by_candidate(candidate_uuid)?
            .ok_or(MatchingServiceError::NoExamForCandidate(candidate_uuid))?;

        if exam.status == ExamStatus::InProgress {
            return Err(MatchingServiceError::ExamNotSubmitted(exam.uuid));
        }
        let score = exam
            .total_score
            .ok_or(MatchingServiceError::MissingScore(exam.uuid))?;

        Ok(self.jobs.find_compatible_positions(score)?)
    }
}
