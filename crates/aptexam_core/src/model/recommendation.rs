//! Study recommendation models.

use crate::model::job::PositionId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row id for study recommendations.
pub type RecommendationId = i64;

/// Validation failures for recommendation write paths.
#[derive(Debug)]
pub enum RecommendationValidationError {
    /// Title is blank.
    BlankTitle,
    /// Institution is blank.
    BlankInstitution,
    /// No target positions were provided for the link set.
    EmptyPositionSet,
}

impl Display for RecommendationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "recommendation title cannot be blank"),
            Self::BlankInstitution => write!(f, "recommendation institution cannot be blank"),
            Self::EmptyPositionSet => {
                write!(f, "recommendation must target at least one position")
            }
        }
    }
}

impl Error for RecommendationValidationError {}

/// Input shape for saving one study recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationDraft {
    pub title: String,
    pub institution: String,
    pub url: Option<String>,
}

impl RecommendationDraft {
    pub fn new(title: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            institution: institution.into(),
            url: None,
        }
    }

    pub fn validate(&self) -> Result<(), RecommendationValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecommendationValidationError::BlankTitle);
        }
        if self.institution.trim().is_empty() {
            return Err(RecommendationValidationError::BlankInstitution);
        }
        Ok(())
    }
}

/// Study recommendation read model with linked positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRecommendation {
    pub id: RecommendationId,
    pub title: String,
    pub institution: String,
    pub url: Option<String>,
    pub is_active: bool,
    /// Linked position ids, sorted ascending.
    pub position_ids: Vec<PositionId>,
}
