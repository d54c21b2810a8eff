//! Media locator resolution.
//!
//! The backend reports artifact locators relative to its media root. Consumers
//! outside the backend need them prefixed with the public media base.

use crate::config::IngestConfig;
use crate::models::Job;

/// Prefixes backend-relative media locators with a configured base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base: String,
}

impl MediaResolver {
    /// The base is used verbatim; no slash is added or removed.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.media_base_url.clone())
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn resolve_locator(&self, locator: &str) -> String {
        format!("{}{}", self.base, locator)
    }

    /// Rewrite the job's `image`. Absent or empty locators pass through unchanged.
    pub fn resolve(&self, mut job: Job) -> Job {
        job.image = match job.image {
            Some(locator) if !locator.is_empty() => Some(self.resolve_locator(&locator)),
            other => other,
        };
        job
    }

    pub fn resolve_all(&self, jobs: Vec<Job>) -> Vec<Job> {
        jobs.into_iter().map(|job| self.resolve(job)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;

    fn job_with_image(image: Option<&str>) -> Job {
        Job {
            id: None,
            job_id: Some("j".to_string()),
            image: image.map(str::to_string),
            status: JobStatus::Processing,
            name: "a.png".to_string(),
            size: 3,
            media_type: "image/png".to_string(),
            upload_time: None,
            uploaded_at: None,
            finished_at: None,
        }
    }

    #[test]
    fn test_prefixes_relative_locator() {
        let resolver = MediaResolver::new("https://cdn.example/");
        let job = resolver.resolve(job_with_image(Some("abc.png")));
        assert_eq!(job.image.as_deref(), Some("https://cdn.example/abc.png"));
    }

    #[test]
    fn test_absent_image_passes_through() {
        let resolver = MediaResolver::new("https://cdn.example/");
        let original = job_with_image(None);
        assert_eq!(resolver.resolve(original.clone()), original);
    }

    #[test]
    fn test_empty_image_passes_through() {
        let resolver = MediaResolver::new("https://cdn.example/");
        let original = job_with_image(Some(""));
        assert_eq!(resolver.resolve(original.clone()), original);
    }

    #[test]
    fn test_malformed_locator_is_not_rejected() {
        let resolver = MediaResolver::new("http://localhost:8000");
        let job = resolver.resolve(job_with_image(Some("::not a path::")));
        assert_eq!(job.image.as_deref(), Some("http://localhost:8000::not a path::"));
    }

    #[test]
    fn test_only_image_field_changes() {
        let resolver = MediaResolver::new("https://cdn.example");
        let original = job_with_image(Some("/media/images/a.png"));
        let resolved = resolver.resolve(original.clone());
        assert_eq!(resolved.name, original.name);
        assert_eq!(resolved.status, original.status);
        assert_eq!(resolved.job_id, original.job_id);
    }

    #[test]
    fn test_from_config_uses_media_base() {
        let mut config = IngestConfig::default();
        config.media_base_url = "https://cdn.example/".to_string();
        assert_eq!(MediaResolver::from_config(&config).base(), "https://cdn.example/");
    }
}
