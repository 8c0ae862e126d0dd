//! Study recommendation use-case service.
//!
//! # Responsibility
//! - Validate and persist recommendations with their position links.
//! - Record an audit row for every rejected save attempt.
//!
//! # Invariants
//! - A recommendation must target at least one position.
//! - The recommendation and its links commit together; a rejected save
//!   leaves no recommendation row.
//! - Every rejection leaves a row in `failed_recommendation_attempts`
//!   before the error is propagated.

use crate::model::job::PositionId;
use crate::model::recommendation::{
    RecommendationDraft, RecommendationValidationError, StudyRecommendation,
};
use crate::model::settings::FailedRecommendationAttempt;
use crate::repo::recommendation_repo::RecommendationRepository;
use crate::repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for recommendation use-cases.
#[derive(Debug)]
pub enum RecommendationServiceError {
    /// Input failed validation; an audit row was recorded.
    Rejected(RecommendationValidationError),
    /// Persistence-layer failure; an audit row was recorded when the
    /// failure concerned the recommendation itself.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for RecommendationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(err) => write!(f, "recommendation rejected: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent recommendation state: {details}")
            }
        }
    }
}

impl Error for RecommendationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for RecommendationServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Recommendation service facade over the repository implementation.
pub struct RecommendationService<R: RecommendationRepository> {
    repo: R,
}

impl<R: RecommendationRepository> RecommendationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates, persists and links one recommendation.
    ///
    /// Any rejection (validation or persistence) records an audit row with
    /// the failure reason before the error is returned.
    pub fn save_recommendation(
        &mut self,
        draft: RecommendationDraft,
        position_ids: &[PositionId],
    ) -> Result<StudyRecommendation, RecommendationServiceError> {
        if let Err(err) = validate_save(&draft, position_ids) {
            self.audit_rejection(&draft, &err.to_string())?;
            return Err(RecommendationServiceError::Rejected(err));
        }

        let id = match self.repo.insert_with_positions(&draft, position_ids) {
            Ok(id) => id,
            Err(err) => {
                self.audit_rejection(&draft, &err.to_string())?;
                return Err(err.into());
            }
        };

        self.repo
            .get_recommendation(id)?
            .ok_or(RecommendationServiceError::InconsistentState(
                "saved recommendation not found in read-back",
            ))
    }

    /// Gets one recommendation with its linked positions.
    pub fn get_recommendation(
        &self,
        id: i64,
    ) -> Result<Option<StudyRecommendation>, RecommendationServiceError> {
        Ok(self.repo.get_recommendation(id)?)
    }

    /// Lists active recommendations linked to one position.
    pub fn recommendations_for_position(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<StudyRecommendation>, RecommendationServiceError> {
        Ok(self.repo.list_for_position(position_id)?)
    }

    /// Lists the most recent rejected save attempts, newest first.
    pub fn recent_failed_attempts(
        &self,
        limit: u32,
    ) -> Result<Vec<FailedRecommendationAttempt>, RecommendationServiceError> {
        Ok(self.repo.list_failed_attempts(limit)?)
    }

    fn audit_rejection(
        &self,
        draft: &RecommendationDraft,
        reason: &str,
    ) -> Result<(), RecommendationServiceError> {
        warn!(
            "event=recommendation_rejected module=service status=error title_len={} reason={reason}",
            draft.title.len()
        );
        self.repo.record_failed_attempt(draft, reason)?;
        Ok(())
    }
}

fn validate_save(
    draft: &RecommendationDraft,
    position_ids: &[PositionId],
) -> Result<(), RecommendationValidationError> {
    draft.validate()?;
    if position_ids.is_empty() {
        return Err(RecommendationValidationError::EmptyPositionSet);
    }
    Ok(())
}
