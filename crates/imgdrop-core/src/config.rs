//! Configuration module
//!
//! Process-wide ingestion settings: backend endpoints, the media base used to
//! resolve artifact locators, and the upload policy enforced by the validator.
//! Built once at startup, validated, then shared read-only (usually behind an `Arc`).

use std::env;
use std::time::Duration;

// Common constants
const API_BASE_URL: &str = "http://localhost:8000";
const UPLOAD_PATH: &str = "/api/upload";
const BATCH_UPLOAD_PATH: &str = "/api/async/batch/upload";
const LIST_PATH: &str = "/api/list";
const MAX_UPLOAD_BYTES: u64 = 400_000;
const ALLOWED_CONTENT_TYPES: &str = "image/jpg,image/jpeg,image/png,image/webp";
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Acceptance rules applied to every candidate before submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Exclusive ceiling on the declared size, in bytes
    pub max_upload_bytes: u64,
    /// Lowercase MIME types accepted as declared media type
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            allowed_content_types: split_list(ALLOWED_CONTENT_TYPES),
        }
    }
}

/// Backend paths, relative to the API base URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub upload_path: String,
    pub batch_upload_path: String,
    pub list_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            upload_path: UPLOAD_PATH.to_string(),
            batch_upload_path: BATCH_UPLOAD_PATH.to_string(),
            list_path: LIST_PATH.to_string(),
        }
    }
}

/// Ingestion client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    /// Base URL of the ingestion backend, without trailing slash
    pub api_base_url: String,
    /// Prefix for backend-relative media locators. Kept verbatim.
    pub media_base_url: String,
    pub endpoints: Endpoints,
    pub upload: UploadPolicy,
    /// Request timeout handed to the HTTP client. 0 = no timeout.
    pub http_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::for_base_url(API_BASE_URL)
    }
}

impl IngestConfig {
    /// Default configuration pointed at `base_url`, with media served from the same host.
    pub fn for_base_url(base_url: &str) -> Self {
        let api_base_url = base_url.trim_end_matches('/').to_string();
        Self {
            media_base_url: api_base_url.clone(),
            api_base_url,
            endpoints: Endpoints::default(),
            upload: UploadPolicy::default(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }

    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// Optional environment variables:
    /// - IMGDROP_API_URL: backend base URL (default: http://localhost:8000)
    /// - IMGDROP_MEDIA_URL: media locator prefix (default: the API URL)
    /// - IMGDROP_UPLOAD_PATH / IMGDROP_BATCH_UPLOAD_PATH / IMGDROP_LIST_PATH
    /// - IMGDROP_MAX_UPLOAD_BYTES: exclusive size ceiling (default: 400000)
    /// - IMGDROP_ALLOWED_CONTENT_TYPES: comma-separated MIME whitelist
    /// - IMGDROP_HTTP_TIMEOUT_SECS: HTTP client timeout, 0 disables (default: 60)
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_vars(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("IMGDROP_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| API_BASE_URL.to_string());

        let media_base_url = lookup("IMGDROP_MEDIA_URL")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| api_base_url.clone());

        let endpoints = Endpoints {
            upload_path: lookup("IMGDROP_UPLOAD_PATH").unwrap_or_else(|| UPLOAD_PATH.to_string()),
            batch_upload_path: lookup("IMGDROP_BATCH_UPLOAD_PATH")
                .unwrap_or_else(|| BATCH_UPLOAD_PATH.to_string()),
            list_path: lookup("IMGDROP_LIST_PATH").unwrap_or_else(|| LIST_PATH.to_string()),
        };

        let max_upload_bytes = match lookup("IMGDROP_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("IMGDROP_MAX_UPLOAD_BYTES must be an integer: {}", e)
            })?,
            None => MAX_UPLOAD_BYTES,
        };

        let allowed_content_types = split_list(
            &lookup("IMGDROP_ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|| ALLOWED_CONTENT_TYPES.to_string()),
        );

        let http_timeout_secs = match lookup("IMGDROP_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("IMGDROP_HTTP_TIMEOUT_SECS must be an integer: {}", e)
            })?,
            None => HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url,
            media_base_url,
            endpoints,
            upload: UploadPolicy {
                max_upload_bytes,
                allowed_content_types,
            },
            http_timeout_secs,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (name, url) in [
            ("IMGDROP_API_URL", &self.api_base_url),
            ("IMGDROP_MEDIA_URL", &self.media_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "{} must be an http(s) URL, got '{}'",
                    name,
                    url
                ));
            }
        }

        for (name, path) in [
            ("IMGDROP_UPLOAD_PATH", &self.endpoints.upload_path),
            ("IMGDROP_BATCH_UPLOAD_PATH", &self.endpoints.batch_upload_path),
            ("IMGDROP_LIST_PATH", &self.endpoints.list_path),
        ] {
            if !path.starts_with('/') {
                return Err(anyhow::anyhow!("{} must start with '/'", name));
            }
        }

        if self.upload.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!(
                "IMGDROP_MAX_UPLOAD_BYTES must be greater than zero"
            ));
        }

        if self.upload.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "IMGDROP_ALLOWED_CONTENT_TYPES must list at least one type"
            ));
        }

        Ok(())
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.endpoints.upload_path)
    }

    pub fn batch_upload_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.endpoints.batch_upload_path)
    }

    pub fn list_url(&self) -> String {
        format!("{}{}", self.api_base_url, self.endpoints.list_path)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        match self.http_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
