//! Candidate domain model.
//!
//! # Responsibility
//! - Define the canonical candidate record.
//! - Validate identity fields (email, CUIL) before persistence.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another candidate.
//! - `email` and `cuil` are unique across candidates (enforced by schema).
//! - `cuil` is stored normalized: 11 digits, no separators.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for candidates.
pub type CandidateId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// CUIL check-digit weights applied to the first ten digits.
const CUIL_WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

/// Validation failures for candidate write paths.
#[derive(Debug)]
pub enum CandidateValidationError {
    /// First or last name is blank.
    BlankName,
    /// Email does not match the accepted address shape.
    InvalidEmail(String),
    /// CUIL is not 11 digits or fails the mod-11 check digit.
    InvalidCuil(String),
}

impl Display for CandidateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "candidate name cannot be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidCuil(value) => write!(f, "invalid CUIL: `{value}`"),
        }
    }
}

impl Error for CandidateValidationError {}

/// Canonical candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable global ID used for exam linkage and auditing.
    pub uuid: CandidateId,
    pub first_name: String,
    pub last_name: String,
    /// Unique login/contact address, compared case-insensitively.
    pub email: String,
    /// Normalized 11-digit tax identifier.
    pub cuil: String,
    /// Home locality, `None` when the candidate did not provide one.
    pub locality_id: Option<i64>,
}

impl Candidate {
    /// Creates a candidate with a generated stable ID.
    ///
    /// The CUIL is stored as given; call [`Candidate::validate`] (or let the
    /// repository do it) to reject malformed values. Repositories normalize
    /// the CUIL to bare digits before persistence.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        cuil: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            cuil: cuil.into(),
            locality_id: None,
        }
    }

    /// Checks name, email and CUIL field invariants.
    pub fn validate(&self) -> Result<(), CandidateValidationError> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(CandidateValidationError::BlankName);
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(CandidateValidationError::InvalidEmail(self.email.clone()));
        }
        if normalize_cuil(&self.cuil).is_none() {
            return Err(CandidateValidationError::InvalidCuil(self.cuil.clone()));
        }
        Ok(())
    }
}

/// Normalizes a CUIL to its 11-digit storage form.
///
/// Accepts common separator styles (`20-12345678-6`, spaces) and returns
/// `None` when the digit count is wrong or the check digit does not verify.
pub fn normalize_cuil(raw: &str) -> Option<String> {
    let digits: Vec<u32> = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '.'))
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()?;

    if digits.len() != 11 {
        return None;
    }

    let sum: u32 = digits
        .iter()
        .take(10)
        .zip(CUIL_WEIGHTS)
        .map(|(digit, weight)| digit * weight)
        .sum();
    let expected = match 11 - (sum % 11) {
        11 => 0,
        10 => 9,
        value => value,
    };

    if digits[10] != expected {
        return None;
    }

    Some(digits.iter().map(|d| char::from(b'0' + *d as u8)).collect())
}
