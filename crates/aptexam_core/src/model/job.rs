//! Job catalog models: professional roles and open positions.
//!
//! # Invariants
//! - `min_score` of `None` means "no minimum" on both roles and positions.
//! - Inactive roles/positions are excluded from candidate matching.

use crate::model::geo::ProvinceId;
use serde::{Deserialize, Serialize};

/// Row id for professional roles.
pub type RoleId = i64;
/// Row id for job positions.
pub type PositionId = i64;

/// Professional role record with an optional aptitude floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalRole {
    pub id: RoleId,
    pub name: String,
    /// Minimum exam score required for any position of this role.
    pub min_score: Option<i64>,
    pub is_active: bool,
}

/// Open job position record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosition {
    pub id: PositionId,
    pub title: String,
    pub role_id: RoleId,
    /// Province the position is located in, `None` for remote openings.
    pub province_id: Option<ProvinceId>,
    /// Position-specific minimum exam score, layered on the role floor.
    pub min_score: Option<i64>,
    pub is_active: bool,
}
