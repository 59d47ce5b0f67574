use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for releaser operations
#[derive(Error, Debug)]
pub enum ReleaserError {
    #[error("Cannot find any release strategy in current directory")]
    StrategyNotFound,

    #[error("Invalid regexp: {pattern} (patterns={patterns:?})")]
    InvalidPattern {
        pattern: String,
        patterns: Vec<String>,
        #[source]
        source: regex::Error,
    },

    #[error("Application {0} not found in release strategy")]
    ApplicationNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version not found{}", .source_hint.as_ref().map(|s| format!(" in '{}'", s)).unwrap_or_default())]
    VersionNotFound { source_hint: Option<String> },

    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("Output filepath already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("No manifest found at {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Cannot read a manifest back from {0}")]
    ReadBackUnsupported(String),

    #[error("Invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("Failed to send webhook to {url}: {status} {reason}")]
    WebhookStatus {
        url: String,
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Bake failed: {0}")]
    Bake(String),

    #[error("{0}")]
    Usage(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience type alias for Results in releaser
pub type Result<T> = std::result::Result<T, ReleaserError>;

impl ReleaserError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaserError::Config(msg.into())
    }

    /// Create a bake error with context
    pub fn bake(msg: impl Into<String>) -> Self {
        ReleaserError::Bake(msg.into())
    }

    /// Create a usage error (bad flag combination on the command line)
    pub fn usage(msg: impl Into<String>) -> Self {
        ReleaserError::Usage(msg.into())
    }

    /// Create a version-not-found error for the given source hint
    pub fn version_not_found(source_hint: Option<&str>) -> Self {
        ReleaserError::VersionNotFound {
            source_hint: source_hint.map(str::to_string),
        }
    }
}
