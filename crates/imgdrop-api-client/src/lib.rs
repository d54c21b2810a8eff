//! HTTP client for the imgdrop ingestion backend.
//!
//! Wraps a single `reqwest::Client` configured from [`IngestConfig`] and
//! provides the two backend interactions: submitting validated batches
//! ([`submit`]) and fetching the job listing ([`listing`]). The [`reconciler`]
//! module ties listings to the client-side job registry.

pub mod error;
pub mod listing;
pub mod reconciler;
pub mod submit;

use std::sync::Arc;

use anyhow::{Context, Result};
use imgdrop_core::IngestConfig;
use reqwest::Client;

pub use error::{ListingFailure, SubmitError};
pub use reconciler::{Reconciler, Refresh};
pub use submit::Acceptance;

/// HTTP client for the ingestion backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: Arc<IngestConfig>,
}

impl ApiClient {
    pub fn new(config: Arc<IngestConfig>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        tracing::debug!(
            api_base_url = %config.api_base_url,
            timeout_secs = config.http_timeout().map(|t| t.as_secs()),
            "Created ingestion API client"
        );

        Ok(Self { client, config })
    }

    /// Create client from environment. See [`IngestConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        let config = IngestConfig::from_env().context("Failed to load ingestion configuration")?;
        Self::new(Arc::new(config))
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }
}
