//! Job listing.
//!
//! Listing failures are swallowed: callers always get a [`Listing`], empty and
//! marked degraded when the backend could not be read.

use imgdrop_core::{Job, Listing, ListingOrder, MediaResolver};

use crate::{error::ListingFailure, ApiClient};

impl ApiClient {
    /// Fetch the listing and apply `order`. Never fails.
    pub async fn fetch_listing(&self, order: ListingOrder) -> Listing {
        match self.try_fetch_jobs().await {
            Ok(jobs) => {
                tracing::debug!(count = jobs.len(), order = ?order, "Fetched job listing");
                Listing::fetched(jobs).ordered(order)
            }
            Err(failure) => {
                tracing::warn!(
                    url = %self.config.list_url(),
                    error = %failure,
                    "Job listing unavailable, returning empty listing"
                );
                Listing::degraded(failure.to_reason())
            }
        }
    }

    /// Jobs only; an unreachable backend yields an empty sequence.
    pub async fn list_jobs(&self, order: ListingOrder) -> Vec<Job> {
        self.fetch_listing(order).await.into_jobs()
    }

    /// Listing with every artifact locator prefixed by the configured media base.
    pub async fn fetch_presented(&self, order: ListingOrder) -> Listing {
        let resolver = MediaResolver::from_config(&self.config);
        self.fetch_listing(order).await.with_resolved_media(&resolver)
    }

    async fn try_fetch_jobs(&self) -> Result<Vec<Job>, ListingFailure> {
        let url = self.config.list_url();
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(ListingFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ListingFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(ListingFailure::Transport)?;
        serde_json::from_str::<Vec<Job>>(&text).map_err(ListingFailure::Decode)
    }
}
