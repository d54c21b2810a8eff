//! Polling reconciliation.
//!
//! A [`Reconciler`] owns the job registry and submission ledger for one
//! session. Each [`Reconciler::refresh`] fetches one listing and merges it into
//! both. There is no push channel; callers decide when to refresh.

use std::time::Duration;

use imgdrop_core::{
    JobRegistry, LedgerStatus, Listing, ListingOrder, ReconcileReport, SubmissionLedger,
    UploadBatch, UploadCandidate,
};
use serde::Serialize;

use crate::{submit::Acceptance, ApiClient, SubmitError};

/// Result of one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Refresh {
    #[serde(skip)]
    pub listing: Listing,
    pub report: ReconcileReport,
    /// Ledger match against this listing; `None` when nothing was submitted
    pub ledger: Option<LedgerStatus>,
}

impl Refresh {
    /// Everything submitted this session is listed and terminal.
    pub fn is_finished(&self) -> bool {
        self.ledger.as_ref().is_some_and(LedgerStatus::is_finished)
    }
}

#[derive(Debug)]
pub struct Reconciler {
    client: ApiClient,
    order: ListingOrder,
    registry: JobRegistry,
    ledger: SubmissionLedger,
}

impl Reconciler {
    pub fn new(client: ApiClient, order: ListingOrder) -> Self {
        Self {
            client,
            order,
            registry: JobRegistry::new(),
            ledger: SubmissionLedger::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    /// Submit a batch and record it in the ledger once accepted.
    pub async fn submit(
        &mut self,
        candidates: Vec<UploadCandidate>,
    ) -> Result<(UploadBatch, Acceptance), SubmitError> {
        let (batch, acceptance) = self.client.submit_candidates(candidates).await?;
        self.ledger.record_batch(&batch);
        Ok((batch, acceptance))
    }

    /// Fetch one listing and merge it.
    pub async fn refresh(&mut self) -> Refresh {
        let listing = self.client.fetch_presented(self.order).await;
        let report = self.registry.reconcile(&listing);
        let ledger = (!self.ledger.is_empty()).then(|| self.ledger.reconcile(listing.jobs()));

        if report.has_changes() {
            tracing::info!(
                appeared = report.appeared.len(),
                transitions = report.transitions.len(),
                removed = report.removed.len(),
                "Registry updated"
            );
        }

        Refresh {
            listing,
            report,
            ledger,
        }
    }

    /// Refresh every `interval` until the ledger is finished or `max_polls`
    /// refreshes have run. Returns the last refresh.
    ///
    /// Without any recorded submission there is nothing to finish, so only
    /// `max_polls` ends the loop.
    pub async fn poll_until_finished(&mut self, interval: Duration, max_polls: u32) -> Refresh {
        let mut polls = 0u32;
        loop {
            let refresh = self.refresh().await;
            polls += 1;
            if refresh.is_finished() || polls >= max_polls.max(1) {
                tracing::debug!(polls, finished = refresh.is_finished(), "Stopped polling");
                return refresh;
            }
            tokio::time::sleep(interval).await;
        }
    }
}
