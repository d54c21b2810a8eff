//! Pre-submission checks for upload candidates.
//!
//! Rules run in a fixed order per candidate and the first failing rule wins:
//! presence, then size, then media type. A batch reports the first failing
//! candidate only.

use crate::config::UploadPolicy;
use crate::error::ValidationError;
use crate::models::UploadCandidate;

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Candidate validator bound to an upload policy.
#[derive(Debug, Clone, Copy)]
pub struct CandidateValidator<'a> {
    policy: &'a UploadPolicy,
}

impl<'a> CandidateValidator<'a> {
    pub fn new(policy: &'a UploadPolicy) -> Self {
        Self { policy }
    }

    /// Validate one form slot. `None` means no file was provided.
    pub fn validate(
        &self,
        index: usize,
        candidate: Option<&UploadCandidate>,
    ) -> Result<(), ValidationError> {
        match candidate {
            Some(candidate) => self.validate_candidate(index, candidate),
            None => Err(ValidationError::MissingFile { index }),
        }
    }

    pub fn validate_candidate(
        &self,
        index: usize,
        candidate: &UploadCandidate,
    ) -> Result<(), ValidationError> {
        if !candidate.is_well_formed() {
            return Err(ValidationError::MissingFile { index });
        }

        if candidate.size >= self.policy.max_upload_bytes {
            return Err(ValidationError::TooLarge {
                index,
                name: candidate.filename.clone(),
                size: candidate.size,
                max: self.policy.max_upload_bytes,
            });
        }

        let normalized = normalize_mime_type(&candidate.content_type);
        if !self
            .policy
            .allowed_content_types
            .iter()
            .any(|ct| ct.eq_ignore_ascii_case(&normalized))
        {
            return Err(ValidationError::UnsupportedType {
                index,
                name: candidate.filename.clone(),
                content_type: candidate.content_type.clone(),
                allowed: self.policy.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_batch(&self, candidates: &[UploadCandidate]) -> Result<(), ValidationError> {
        if candidates.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        candidates
            .iter()
            .enumerate()
            .try_for_each(|(index, candidate)| self.validate_candidate(index, candidate))
    }

    pub fn validate_slots(&self, slots: &[Option<UploadCandidate>]) -> Result<(), ValidationError> {
        if slots.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        slots
            .iter()
            .enumerate()
            .try_for_each(|(index, slot)| self.validate(index, slot.as_ref()))
    }

    pub fn is_accepted(&self, candidate: &UploadCandidate) -> bool {
        self.validate_candidate(0, candidate).is_ok()
    }
}
