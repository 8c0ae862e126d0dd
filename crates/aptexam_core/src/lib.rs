//! Core data-access layer for the job-aptitude exam platform.
//! This crate is the single source of truth for persistence contracts.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::candidate::{normalize_cuil, Candidate, CandidateId, CandidateValidationError};
pub use model::exam::{Exam, ExamAnswer, ExamId, ExamStatus};
pub use model::geo::{Locality, LocalityId, Province, ProvinceId};
pub use model::job::{JobPosition, PositionId, ProfessionalRole, RoleId};
pub use model::question::{
    AnswerOption, KnowledgeArea, OptionId, Question, QuestionId, QuestionValidationError,
};
pub use model::recommendation::{
    RecommendationDraft, RecommendationId, RecommendationValidationError, StudyRecommendation,
};
pub use model::settings::{FailedRecommendationAttempt, SystemSetting};
pub use repo::candidate_repo::{
    CandidateListQuery, CandidateRepository, ProvinceCandidateCount, SqliteCandidateRepository,
};
pub use repo::exam_repo::{ExamRepository, SqliteExamRepository, StatusExamCount};
pub use repo::geo_repo::{GeoRepository, SqliteGeoRepository};
pub use repo::job_repo::{JobRepository, PositionListQuery, SqliteJobRepository};
pub use repo::question_repo::{AreaQuestionCount, QuestionRepository, SqliteQuestionRepository};
pub use repo::recommendation_repo::{RecommendationRepository, SqliteRecommendationRepository};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::{RepoError, RepoResult};
pub use service::exam_service::{ExamService, ExamServiceError, ExamSession};
pub use service::matching_service::{MatchingService, MatchingServiceError};
pub use service::recommendation_service::{RecommendationService, RecommendationServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
