//! Validation modules

pub mod candidate;

pub use candidate::{normalize_mime_type, CandidateValidator};
