use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::candidate::CandidateDescriptor;

/// Processing status as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Aborted,
    Error,
    /// Any status string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Aborted => write!(f, "aborted"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl JobStatus {
    pub fn phase(&self) -> JobPhase {
        match self {
            JobStatus::Pending | JobStatus::Processing | JobStatus::Unknown => JobPhase::Active,
            JobStatus::Completed => JobPhase::Ready,
            JobStatus::Aborted | JobStatus::Error => JobPhase::Failed,
        }
    }

    /// Position in the forward-only lifecycle. Terminal statuses share the top rank.
    pub fn rank(&self) -> u8 {
        match self {
            JobStatus::Unknown => 0,
            JobStatus::Pending => 1,
            JobStatus::Processing => 2,
            JobStatus::Completed | JobStatus::Aborted | JobStatus::Error => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

/// Coarse lifecycle phase of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    /// Queued or processing on the backend
    Active,
    /// Processing finished successfully
    Ready,
    /// Processing failed or was aborted
    Failed,
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Ready | JobPhase::Failed)
    }
}

/// Processing duration reported by the backend, either seconds or a display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadTime {
    Seconds(f64),
    Text(String),
}

impl UploadTime {
    /// Seconds, when they can be read from the value (e.g. "1.2 seconds" -> 1.2).
    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            UploadTime::Seconds(secs) => Some(*secs),
            UploadTime::Text(text) => text.split_whitespace().next()?.parse().ok(),
        }
    }
}

impl Display for UploadTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadTime::Seconds(secs) => write!(f, "{:.1} seconds", secs),
            UploadTime::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Backend record of one ingested item, as returned by the listing endpoint.
///
/// Owned by the backend; the client only ever holds a cached copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Backend primary key, when the listing exposes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    /// Artifact locator, absent until processing produced one
    #[serde(default)]
    pub image: Option<String>,
    pub status: JobStatus,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub upload_time: Option<UploadTime>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Registry key: the job id, falling back to the backend primary key.
    pub fn key(&self) -> Option<&str> {
        self.job_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.id.as_deref().filter(|id| !id.is_empty()))
    }

    pub fn phase(&self) -> JobPhase {
        self.status.phase()
    }

    pub fn has_artifact(&self) -> bool {
        self.image.as_deref().is_some_and(|image| !image.is_empty())
    }

    /// Completed and carrying an artifact locator.
    pub fn is_ready(&self) -> bool {
        self.phase() == JobPhase::Ready && self.has_artifact()
    }

    pub fn is_failed(&self) -> bool {
        self.phase() == JobPhase::Failed
    }

    pub fn descriptor(&self) -> CandidateDescriptor {
        CandidateDescriptor {
            name: self.name.clone(),
            size: self.size,
            content_type: self.media_type.to_lowercase(),
        }
    }
}

/// Accepts RFC 3339 and naive (assumed UTC) timestamps; anything else becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
