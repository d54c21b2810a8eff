//! Batch submission.
//!
//! A submission is one multipart POST. Single uploads send their file under
//! the `image` field; batches repeat the `images` field once per candidate, in
//! batch order. Validation always runs first: a batch that fails it never
//! reaches the network.

use imgdrop_core::{
    validation::normalize_mime_type, CandidateValidator, UploadBatch, UploadCandidate,
    ValidationError,
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::{error::SubmitError, ApiClient};

/// Multipart field for the single-file endpoint
pub const SINGLE_FIELD: &str = "image";
/// Multipart field repeated once per file on the batch endpoint
pub const BATCH_FIELD: &str = "images";

/// The backend accepted a submission.
///
/// Acceptance covers the request only. Whether each file is processed
/// successfully shows up later, through the listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acceptance {
    pub status: u16,
    pub item_count: usize,
    /// Response body, when the backend returned JSON
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Single,
    Batch,
}

impl ApiClient {
    /// Validate one candidate and post it to the single-file endpoint.
    pub async fn submit_single(
        &self,
        candidate: UploadCandidate,
    ) -> Result<Acceptance, SubmitError> {
        let batch = UploadBatch::single(candidate, &self.config.upload).map_err(|err| {
            tracing::debug!(error = %err, "Candidate rejected before submission");
            err
        })?;
        self.send(Endpoint::Single, &batch).await
    }

    /// Post a validated batch to the batch endpoint.
    ///
    /// The batch is checked again against this client's policy, since it may
    /// have been built under a different one.
    pub async fn submit_batch(&self, batch: &UploadBatch) -> Result<Acceptance, SubmitError> {
        if batch.is_empty() {
            tracing::debug!("Refusing to submit an empty batch");
            return Err(ValidationError::EmptyBatch.into());
        }
        CandidateValidator::new(&self.config.upload).validate_batch(batch.candidates())?;
        self.send(Endpoint::Batch, batch).await
    }

    /// Validate `candidates` as one batch, then submit it.
    ///
    /// Returns the batch alongside the acceptance so callers can record it in a
    /// [`imgdrop_core::SubmissionLedger`].
    pub async fn submit_candidates(
        &self,
        candidates: Vec<UploadCandidate>,
    ) -> Result<(UploadBatch, Acceptance), SubmitError> {
        let batch = UploadBatch::new(candidates, &self.config.upload).map_err(|err| {
            tracing::debug!(error = %err, "Batch rejected before submission");
            err
        })?;
        let acceptance = self.submit_batch(&batch).await?;
        Ok((batch, acceptance))
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        batch: &UploadBatch,
    ) -> Result<Acceptance, SubmitError> {
        let (url, field) = match endpoint {
            Endpoint::Single => (self.config.upload_url(), SINGLE_FIELD),
            Endpoint::Batch => (self.config.batch_upload_url(), BATCH_FIELD),
        };
        let form = build_form(field, batch, &self.config.upload.allowed_content_types)?;

        tracing::info!(
            url = %url,
            files = batch.len(),
            total_bytes = batch.total_bytes(),
            "Submitting upload batch"
        );

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to send upload request");
                SubmitError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let diagnostic = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                url = %url,
                status = status.as_u16(),
                diagnostic = %diagnostic,
                "Upload request rejected"
            );
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                diagnostic,
            });
        }

        let body = response.json::<serde_json::Value>().await.ok();
        tracing::info!(status = status.as_u16(), files = batch.len(), "Upload batch accepted");

        Ok(Acceptance {
            status: status.as_u16(),
            item_count: batch.len(),
            body,
        })
    }
}

/// One part per candidate, all under `field`, in batch order.
fn build_form(
    field: &'static str,
    batch: &UploadBatch,
    allowed: &[String],
) -> Result<Form, ValidationError> {
    batch
        .candidates()
        .iter()
        .enumerate()
        .try_fold(Form::new(), |form, (index, candidate)| {
            let content_type = normalize_mime_type(&candidate.content_type);
            let part = Part::bytes(candidate.data.to_vec())
                .file_name(candidate.filename.clone())
                .mime_str(&content_type)
                .map_err(|_| ValidationError::UnsupportedType {
                    index,
                    name: candidate.filename.clone(),
                    content_type: candidate.content_type.clone(),
                    allowed: allowed.to_vec(),
                })?;
            Ok(form.part(field, part))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgdrop_core::UploadPolicy;

    #[test]
    fn test_build_form_normalizes_declared_types() {
        let batch = UploadBatch::new(
            vec![
                UploadCandidate::new("a.jpg", "image/jpeg", vec![1u8; 4]),
                UploadCandidate::new("b.png", "IMAGE/PNG", vec![2u8; 4]),
            ],
            &UploadPolicy::default(),
        )
        .unwrap();

        let policy = UploadPolicy::default();
        let form = build_form(BATCH_FIELD, &batch, &policy.allowed_content_types).unwrap();
        assert!(!form.boundary().is_empty());
    }
}
