//! Client-side job registry.
//!
//! A cache of the jobs the backend has reported, refreshed by feeding it
//! listings. Every change is observed, never forced: the registry only moves a
//! job forward along pending -> processing -> terminal, ignores observations
//! that would move it backward (stale reads) or out of a terminal state, and
//! drops jobs that vanish from an authoritative listing.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::listing::Listing;
use crate::models::{Job, JobPhase, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub key: String,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// An observation the registry refused because it would move a job backward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleObservation {
    pub key: String,
    pub current: JobStatus,
    pub observed: JobStatus,
}

/// What changed during one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub appeared: Vec<Job>,
    pub transitions: Vec<Transition>,
    pub removed: Vec<Job>,
    pub stale: Vec<StaleObservation>,
    /// Records carrying neither a job id nor a primary key
    pub unkeyed: usize,
    /// The listing was degraded; nothing was applied
    pub degraded: bool,
}

impl ReconcileReport {
    pub fn has_changes(&self) -> bool {
        !self.appeared.is_empty() || !self.transitions.is_empty() || !self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    pub active: usize,
    pub ready: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: HashMap<String, Job>,
    /// Keys in the order of the last authoritative listing
    order: Vec<String>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Job> {
        self.jobs.get(key)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Known jobs, in the order of the last applied listing.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.order.iter().filter_map(|key| self.jobs.get(key))
    }

    pub fn counts(&self) -> PhaseCounts {
        self.jobs
            .values()
            .fold(PhaseCounts::default(), |mut counts, job| {
                match job.phase() {
                    JobPhase::Active => counts.active += 1,
                    JobPhase::Ready => counts.ready += 1,
                    JobPhase::Failed => counts.failed += 1,
                }
                counts
            })
    }

    /// Merge one listing into the registry.
    ///
    /// A degraded listing is not authoritative: it is reported but leaves the
    /// registry untouched, so an outage never reads as every job being removed.
    pub fn reconcile(&mut self, listing: &Listing) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if let Some(reason) = listing.degrade_reason() {
            tracing::warn!(
                reason = %reason,
                known_jobs = self.jobs.len(),
                "Skipping reconciliation of degraded listing"
            );
            report.degraded = true;
            return report;
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(listing.len());
        let mut order = Vec::with_capacity(listing.len());

        for job in listing.jobs() {
            let Some(key) = job.key().map(str::to_string) else {
                tracing::warn!(name = %job.name, "Listing record has no job id, skipping");
                report.unkeyed += 1;
                continue;
            };

            if !seen.insert(key.clone()) {
                tracing::warn!(job_id = %key, "Duplicate job id in listing, keeping first record");
                continue;
            }
            order.push(key.clone());

            match self.jobs.get(&key).map(|current| current.status) {
                None => {
                    tracing::debug!(job_id = %key, status = %job.status, "Job appeared");
                    self.jobs.insert(key, job.clone());
                    report.appeared.push(job.clone());
                }
                Some(current) if current == job.status => {
                    // Same status; refresh fields the backend fills in later.
                    self.jobs.insert(key, job.clone());
                }
                Some(current) if Self::is_forward(current, job.status) => {
                    tracing::info!(
                        job_id = %key,
                        from = %current,
                        to = %job.status,
                        "Job status changed"
                    );
                    report.transitions.push(Transition {
                        key: key.clone(),
                        from: current,
                        to: job.status,
                    });
                    self.jobs.insert(key, job.clone());
                }
                Some(current) => {
                    tracing::warn!(
                        job_id = %key,
                        current = %current,
                        observed = %job.status,
                        "Ignoring backward status observation"
                    );
                    report.stale.push(StaleObservation {
                        key,
                        current,
                        observed: job.status,
                    });
                }
            }
        }

        let vanished: Vec<String> = self
            .jobs
            .keys()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();
        for key in vanished {
            if let Some(job) = self.jobs.remove(&key) {
                tracing::info!(
                    job_id = %key,
                    status = %job.status,
                    "Job no longer listed, removing"
                );
                report.removed.push(job);
            }
        }

        self.order = order;
        report
    }

    fn is_forward(current: JobStatus, observed: JobStatus) -> bool {
        !current.is_terminal() && observed.rank() > current.rank()
    }
}
