//! Helpers shared by the `imgdrop` binary: candidate loading, output
//! formatting and tracing setup.

use std::path::{Component, Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use imgdrop_api_client::SubmitError;
use imgdrop_core::{
    ErrorMetadata, Job, LedgerStatus, LogLevel, ReconcileReport, UploadCandidate,
};

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Read a local file into a candidate, inferring the media type from its
/// extension unless `content_type` overrides it.
pub fn load_candidate(path: &Path, content_type: Option<&str>) -> Result<UploadCandidate> {
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
    }

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    // An unnamed path yields an empty filename, which validation reports as a missing file
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let candidate = match content_type {
        Some(declared) => UploadCandidate::new(filename, declared, data),
        None => UploadCandidate::with_inferred_type(filename, data),
    };
    tracing::debug!(
        filename = %candidate.filename,
        content_type = %candidate.content_type,
        size = candidate.size,
        "Loaded upload candidate"
    );
    Ok(candidate)
}

/// Log a submission failure at its level and turn it into the message shown to
/// the user.
pub fn submit_failure(err: SubmitError) -> anyhow::Error {
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(code = err.error_code(), error = %err, "Submission failed")
        }
        LogLevel::Warn => {
            tracing::warn!(code = err.error_code(), error = %err, "Submission failed")
        }
        LogLevel::Error => {
            tracing::error!(code = err.error_code(), error = %err, "Submission failed")
        }
    }

    let message = match err.validation() {
        Some(validation) => match validation.index() {
            Some(index) => format!(
                "{} (file #{}, {}): {}",
                validation.field(),
                index + 1,
                err.error_code(),
                err.client_message()
            ),
            None => format!("{}: {}", validation.field(), err.client_message()),
        },
        None => err.client_message(),
    };
    anyhow::anyhow!(message)
}

pub fn human_size(bytes: u64) -> String {
    if bytes < 1000 {
        format!("{} B", bytes)
    } else if bytes < 1_000_000 {
        format!("{:.1} kB", bytes as f64 / 1000.0)
    } else {
        format!("{:.2} MB", bytes as f64 / 1_000_000.0)
    }
}

pub fn format_job_table(jobs: &[Job]) -> String {
    let mut out = format!(
        "{:<38} {:<11} {:<30} {:>10} {}\n",
        "JOB", "STATUS", "NAME", "SIZE", "IMAGE"
    );
    for job in jobs {
        out.push_str(&format!(
            "{:<38} {:<11} {:<30} {:>10} {}\n",
            job.key().unwrap_or("-"),
            job.status.to_string(),
            truncate_string(&job.name, 30),
            human_size(job.size),
            job.image.as_deref().unwrap_or("-"),
        ));
    }
    out
}

/// One line per change in a reconciliation pass.
pub fn format_report(report: &ReconcileReport) -> Vec<String> {
    let mut lines = Vec::new();
    for job in &report.appeared {
        lines.push(format!(
            "+ {} {} [{}]",
            job.key().unwrap_or("-"),
            job.name,
            job.status
        ));
    }
    for transition in &report.transitions {
        lines.push(format!(
            "~ {} {} -> {}",
            transition.key, transition.from, transition.to
        ));
    }
    for job in &report.removed {
        lines.push(format!("- {} {}", job.key().unwrap_or("-"), job.name));
    }
    lines
}

/// One line per submitted file whose job ended in a failure state.
pub fn format_failed(status: &LedgerStatus) -> Vec<String> {
    status
        .failed()
        .map(|job| {
            format!(
                "Failed: {} ({}, {})",
                job.name,
                job.key().unwrap_or("-"),
                job.status
            )
        })
        .collect()
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgdrop_core::{JobStatus, Transition, ValidationError};
    use std::io::Write;

    fn job(key: &str, name: &str, status: JobStatus) -> Job {
        Job {
            id: None,
            job_id: Some(key.to_string()),
            image: None,
            status,
            name: name.to_string(),
            size: 2048,
            media_type: "image/png".to_string(),
            upload_time: None,
            uploaded_at: None,
            finished_at: None,
        }
    }

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_multibyte() {
        assert_eq!(truncate_string("été-photo.jpg", 6), "été...");
    }

    #[test]
    fn load_candidate_infers_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Holiday.JPG");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0xff, 0xd8, 0xff, 0xe0]).unwrap();

        let candidate = load_candidate(&path, None).unwrap();
        assert_eq!(candidate.filename, "Holiday.JPG");
        assert_eq!(candidate.content_type, "image/jpeg");
        assert_eq!(candidate.size, 4);
    }

    #[test]
    fn load_candidate_honours_declared_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.bin");
        std::fs::write(&path, b"data").unwrap();

        let candidate = load_candidate(&path, Some("image/webp")).unwrap();
        assert_eq!(candidate.content_type, "image/webp");
    }

    #[test]
    fn load_candidate_rejects_parent_dir() {
        let err = load_candidate(Path::new("../secret.png"), None).unwrap_err();
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn load_candidate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_candidate(&dir.path().join("absent.png"), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn submit_failure_names_field_and_file() {
        let err = submit_failure(SubmitError::from(ValidationError::TooLarge {
            index: 1,
            name: "big.jpg".to_string(),
            size: 500_000,
            max: 400_000,
        }));
        assert_eq!(
            err.to_string(),
            "size (file #2, TOO_LARGE): Max 400 kB upload size."
        );

        let err = submit_failure(SubmitError::from(ValidationError::EmptyBatch));
        assert_eq!(err.to_string(), "images: Please upload at least one file.");

        let err = submit_failure(SubmitError::Rejected {
            status: 400,
            diagnostic: "internal detail".to_string(),
        });
        assert_eq!(err.to_string(), "Could not upload files right now.");
    }

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(999), "999 B");
        assert_eq!(human_size(2048), "2.0 kB");
        assert_eq!(human_size(1_500_000), "1.50 MB");
    }

    #[test]
    fn job_table_has_header_and_rows() {
        let table = format_job_table(&[job("j1", "a.png", JobStatus::Processing)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("JOB"));
        assert!(lines[1].contains("processing"));
        assert!(lines[1].contains("2.0 kB"));
    }

    #[test]
    fn failed_lines_only_cover_failed_jobs() {
        let ok = job("j1", "a.png", JobStatus::Completed);
        let broken = job("j2", "b.png", JobStatus::Error);
        let status = LedgerStatus {
            matched: vec![(ok.descriptor(), ok), (broken.descriptor(), broken)],
            outstanding: Vec::new(),
        };
        assert_eq!(format_failed(&status), vec!["Failed: b.png (j2, error)"]);
    }

    #[test]
    fn report_lines() {
        let report = ReconcileReport {
            appeared: vec![job("j1", "a.png", JobStatus::Pending)],
            transitions: vec![Transition {
                key: "j2".to_string(),
                from: JobStatus::Processing,
                to: JobStatus::Completed,
            }],
            removed: vec![job("j3", "c.png", JobStatus::Error)],
            ..ReconcileReport::default()
        };
        assert_eq!(
            format_report(&report),
            vec![
                "+ j1 a.png [pending]",
                "~ j2 processing -> completed",
                "- j3 c.png",
            ]
        );
    }
}
