//! Listing results and ordering.
//!
//! A [`Listing`] is what one fetch of the listing endpoint produced. A failed
//! fetch still yields a listing (empty, marked degraded) so callers that only
//! want jobs never see an error, while callers that care can tell an outage
//! from a genuinely empty backend.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::media_url::MediaResolver;
use crate::models::Job;

/// Ordering transform applied to a fetched listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingOrder {
    /// Keep the order the backend returned
    #[default]
    BackendOrder,
    /// Reverse the backend order
    Reversed,
}

impl ListingOrder {
    pub fn apply(&self, mut jobs: Vec<Job>) -> Vec<Job> {
        if *self == ListingOrder::Reversed {
            jobs.reverse();
        }
        jobs
    }
}

/// Why a fetch degraded to an empty listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradeReason {
    /// No response was received
    Transport { detail: String },
    /// The backend answered with a non-success status
    Status { status: u16, body: String },
    /// The body was not a list of job records
    Decode { detail: String },
}

impl Display for DegradeReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DegradeReason::Transport { detail } => write!(f, "transport failure: {}", detail),
            DegradeReason::Status { status, .. } => write!(f, "backend returned status {}", status),
            DegradeReason::Decode { detail } => write!(f, "invalid listing body: {}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ListingOutcome {
    Fetched,
    Degraded { reason: DegradeReason },
}

/// Result of one listing fetch after the ordering transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    jobs: Vec<Job>,
    outcome: ListingOutcome,
}

impl Listing {
    pub fn fetched(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            outcome: ListingOutcome::Fetched,
        }
    }

    pub fn degraded(reason: DegradeReason) -> Self {
        Self {
            jobs: Vec::new(),
            outcome: ListingOutcome::Degraded { reason },
        }
    }

    pub fn outcome(&self) -> &ListingOutcome {
        &self.outcome
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, ListingOutcome::Degraded { .. })
    }

    pub fn degrade_reason(&self) -> Option<&DegradeReason> {
        match &self.outcome {
            ListingOutcome::Degraded { reason } => Some(reason),
            ListingOutcome::Fetched => None,
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Collapse to the external contract: just the jobs, empty when degraded.
    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }

    pub fn ordered(self, order: ListingOrder) -> Self {
        Self {
            jobs: order.apply(self.jobs),
            outcome: self.outcome,
        }
    }

    pub fn with_resolved_media(self, resolver: &MediaResolver) -> Self {
        Self {
            jobs: resolver.resolve_all(self.jobs),
            outcome: self.outcome,
        }
    }
}
