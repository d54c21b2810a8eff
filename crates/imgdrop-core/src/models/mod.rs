//! Data models for the application
//!
//! Candidates and batches describe what the client wants ingested; jobs are
//! the backend's records of what it actually ingested.

mod candidate;
mod job;

pub use candidate::*;
pub use job::*;
