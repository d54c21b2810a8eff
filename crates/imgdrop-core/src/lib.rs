//! imgdrop core library
//!
//! Domain models, configuration, error types and validation for the ingestion
//! client, plus the pure halves of reconciliation: the job registry, the
//! submission ledger and media locator resolution. Nothing in this crate
//! performs network IO; see `imgdrop-api-client` for that.

pub mod config;
pub mod error;
pub mod ledger;
pub mod listing;
pub mod media_url;
pub mod models;
pub mod registry;
pub mod validation;

// Re-export commonly used types
pub use config::{Endpoints, IngestConfig, UploadPolicy};
pub use error::{ErrorMetadata, LogLevel, ValidationError};
pub use ledger::{LedgerStatus, SubmissionLedger};
pub use listing::{DegradeReason, Listing, ListingOrder, ListingOutcome};
pub use media_url::MediaResolver;
pub use models::{
    CandidateDescriptor, Job, JobPhase, JobStatus, UploadBatch, UploadCandidate, UploadTime,
};
pub use registry::{JobRegistry, PhaseCounts, ReconcileReport, StaleObservation, Transition};
pub use validation::CandidateValidator;
