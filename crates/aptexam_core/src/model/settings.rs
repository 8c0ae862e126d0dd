//! Operational records: system settings and recommendation-save audit rows.

use serde::{Deserialize, Serialize};

/// One key/value system setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    /// Epoch ms of the last write.
    pub updated_at: i64,
}

/// Audit row for a recommendation save that was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecommendationAttempt {
    pub id: i64,
    pub title: String,
    pub institution: String,
    /// Human-readable rejection reason captured at attempt time.
    pub error: String,
    pub attempted_at: i64,
}
