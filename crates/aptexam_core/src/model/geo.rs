//! Geographic lookup models.

use serde::{Deserialize, Serialize};

/// Row id for provinces.
pub type ProvinceId = i64;
/// Row id for localities.
pub type LocalityId = i64;

/// Province lookup record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,
}

/// Locality lookup record, always owned by one province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub id: LocalityId,
    pub province_id: ProvinceId,
    pub name: String,
}
