//! Use-case services orchestrating repositories.
//!
//! # Responsibility
//! - Compose repository calls into exam, matching and recommendation
//!   workflows.
//! - Translate repository errors into use-case specific variants.

pub mod exam_service;
pub mod matching_service;
pub mod recommendation_service;
