//! Submission ledger.
//!
//! The backend never returns job ids for an accepted batch, so the client cannot
//! know which job belongs to which candidate. What it can check is the metadata
//! echo: each job record repeats the candidate's name, size and media type. The
//! ledger remembers that metadata for everything accepted and matches it against
//! listings as a multiset (one job satisfies at most one candidate). A match is
//! evidence that a job with the same description exists, not proof of identity:
//! an older job with identical metadata matches as well.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CandidateDescriptor, Job, UploadBatch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub descriptor: CandidateDescriptor,
    pub accepted_at: DateTime<Utc>,
}

/// Outcome of matching the ledger against one listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerStatus {
    /// Entries with a matching job, paired with that job
    pub matched: Vec<(CandidateDescriptor, Job)>,
    /// Entries no job in the listing accounts for (yet)
    pub outstanding: Vec<CandidateDescriptor>,
}

impl LedgerStatus {
    /// Every accepted candidate is accounted for by some job.
    pub fn is_settled(&self) -> bool {
        self.outstanding.is_empty()
    }

    /// Settled, and every matched job reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.is_settled() && self.matched.iter().all(|(_, job)| job.status.is_terminal())
    }

    /// Entries still waiting on a listing or on a terminal status.
    pub fn unfinished(&self) -> usize {
        self.outstanding.len()
            + self
                .matched
                .iter()
                .filter(|(_, job)| !job.status.is_terminal())
                .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &Job> {
        self.matched
            .iter()
            .map(|(_, job)| job)
            .filter(|job| job.is_failed())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionLedger {
    entries: Vec<LedgerEntry>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted batch. Call only after the backend accepted the request.
    pub fn record_batch(&mut self, batch: &UploadBatch) {
        let accepted_at = Utc::now();
        self.entries.extend(
            batch
                .descriptors()
                .into_iter()
                .map(|descriptor| LedgerEntry {
                    descriptor,
                    accepted_at,
                }),
        );
        tracing::debug!(
            accepted = batch.len(),
            total = self.entries.len(),
            "Recorded accepted batch in ledger"
        );
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reconcile(&self, jobs: &[Job]) -> LedgerStatus {
        let mut used = vec![false; jobs.len()];
        let mut status = LedgerStatus::default();

        for entry in &self.entries {
            let found = jobs
                .iter()
                .enumerate()
                .find(|(i, job)| !used[*i] && entry.descriptor.matches(job));

            match found {
                Some((i, job)) => {
                    used[i] = true;
                    status.matched.push((entry.descriptor.clone(), job.clone()));
                }
                None => status.outstanding.push(entry.descriptor.clone()),
            }
        }

        status
    }
}
