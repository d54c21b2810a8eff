use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::UploadPolicy;
use crate::error::ValidationError;
use crate::validation::{normalize_mime_type, CandidateValidator};

use super::job::Job;

/// A single file proposed for ingestion.
///
/// Lives only between selection and submission; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    /// Original filename, sent as the multipart part filename
    pub filename: String,
    /// Declared media type, as selected or inferred
    pub content_type: String,
    /// Declared size in bytes (what the validator checks)
    pub size: u64,
    pub data: Bytes,
}

impl UploadCandidate {
    /// Candidate whose declared size is the payload length.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Candidate with the content type inferred from the filename extension.
    pub fn with_inferred_type(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for_filename(&filename);
        Self::new(filename, content_type, data)
    }

    /// Override the declared size, e.g. when it comes from a form field.
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// A candidate without a filename is not a usable file object.
    pub fn is_well_formed(&self) -> bool {
        !self.filename.trim().is_empty()
    }

    /// Metadata as the backend will echo it: the type loses any parameters,
    /// matching what goes on the wire.
    pub fn descriptor(&self) -> CandidateDescriptor {
        CandidateDescriptor {
            name: self.filename.clone(),
            size: self.size,
            content_type: normalize_mime_type(&self.content_type),
        }
    }
}

/// Descriptive metadata the backend echoes back on every job record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateDescriptor {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

impl CandidateDescriptor {
    pub fn matches(&self, job: &Job) -> bool {
        self.name == job.name
            && self.size == job.size
            && self.content_type.eq_ignore_ascii_case(&job.media_type)
    }
}

/// Best-effort MIME type for a filename, keyed on the lowercase extension.
pub fn content_type_for_filename(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Ordered, non-empty sequence of candidates that all passed validation.
///
/// Only obtainable through the validating constructors, so a batch that fails
/// on any element is never built and nothing is partially submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    candidates: Vec<UploadCandidate>,
}

impl UploadBatch {
    pub fn new(
        candidates: Vec<UploadCandidate>,
        policy: &UploadPolicy,
    ) -> Result<Self, ValidationError> {
        CandidateValidator::new(policy).validate_batch(&candidates)?;
        Ok(Self { candidates })
    }

    /// Batch from form slots where a slot may be empty (no file selected).
    pub fn from_slots(
        slots: Vec<Option<UploadCandidate>>,
        policy: &UploadPolicy,
    ) -> Result<Self, ValidationError> {
        CandidateValidator::new(policy).validate_slots(&slots)?;
        Ok(Self {
            candidates: slots.into_iter().flatten().collect(),
        })
    }

    /// Batch of one, used by the single-item endpoint.
    pub fn single(
        candidate: UploadCandidate,
        policy: &UploadPolicy,
    ) -> Result<Self, ValidationError> {
        Self::new(vec![candidate], policy)
    }

    pub fn candidates(&self) -> &[UploadCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.candidates.iter().map(|c| c.size).sum()
    }

    pub fn descriptors(&self) -> Vec<CandidateDescriptor> {
        self.candidates.iter().map(UploadCandidate::descriptor).collect()
    }
}
