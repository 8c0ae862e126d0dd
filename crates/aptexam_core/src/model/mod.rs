//! Domain models shared by repositories and services.
//!
//! # Responsibility
//! - Define typed records for every persisted entity.
//! - Host write-path validation so repositories never persist junk.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod candidate;
pub mod exam;
pub mod geo;
pub mod job;
pub mod question;
pub mod recommendation;
pub mod settings;

/// Umbrella over per-model validation failures, consumed by the repository
/// error type.
#[derive(Debug)]
pub enum ValidationError {
    Candidate(candidate::CandidateValidationError),
    Question(question::QuestionValidationError),
    Recommendation(recommendation::RecommendationValidationError),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Candidate(err) => write!(f, "{err}"),
            Self::Question(err) => write!(f, "{err}"),
            Self::Recommendation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Candidate(err) => Some(err),
            Self::Question(err) => Some(err),
            Self::Recommendation(err) => Some(err),
        }
    }
}

impl From<candidate::CandidateValidationError> for ValidationError {
    fn from(value: candidate::CandidateValidationError) -> Self {
        Self::Candidate(value)
    }
}

impl From<question::QuestionValidationError> for ValidationError {
    fn from(value: question::QuestionValidationError) -> Self {
        Self::Question(value)
    }
}

impl From<recommendation::RecommendationValidationError> for ValidationError {
    fn from(value: recommendation::RecommendationValidationError) -> Self {
        Self::Recommendation(value)
    }
}
