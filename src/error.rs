//! Error types for release reconciliation and asset upload.
//!
//! Remote failures are classified once, at the GitHub adapter boundary, into the
//! closed [`ApiError`] set. Everything above the adapter branches on variants.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Result type alias for calls through the remote adapter
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration errors, detected before any remote call
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote hosting service errors
    #[error("GitHub error: {0}")]
    Api(#[from] ApiError),

    /// Per-asset precondition violations
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Tag reference errors
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remote failures, classified at the adapter boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The requested object does not exist
    #[error("not found: {message}")]
    NotFound {
        /// Message returned by the service
        message: String,
    },

    /// The service understood the request but refused to process it
    #[error("unprocessable: {message}")]
    Unprocessable {
        /// Message returned by the service
        message: String,
    },

    /// Request quota exhausted
    #[error("rate limited{}", .retry_after_seconds.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited {
        /// Seconds until the quota resets, when the service says so
        retry_after_seconds: Option<u64>,
    },

    /// Any other failure, including transport errors (no status)
    #[error("{}{message}", .status.map(|s| format!("HTTP {s}: ")).unwrap_or_default())]
    Unknown {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Message returned by the service or the transport
        message: String,
    },
}

impl ApiError {
    /// Check if this is the "does not exist" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Check if this is the "unprocessable" condition
    pub fn is_unprocessable(&self) -> bool {
        matches!(self, ApiError::Unprocessable { .. })
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required value
    #[error("Missing required input: {input}")]
    MissingInput {
        /// Input name
        input: String,
    },

    /// Value that could not be parsed
    #[error("Invalid value for '{input}': {reason}")]
    InvalidValue {
        /// Input name
        input: String,
        /// Reason for the error
        reason: String,
    },

    /// Mutually exclusive inputs set together
    #[error("Conflicting inputs: {inputs:?} cannot be used together")]
    ConflictingInputs {
        /// Inputs that conflict
        inputs: Vec<String>,
    },

    /// Glob pattern that matched no files
    #[error("No files matched pattern '{pattern}'")]
    NoMatchingFiles {
        /// The file pattern
        pattern: String,
    },
}

/// Per-asset precondition violations
#[derive(Error, Debug)]
pub enum AssetError {
    /// Local path is missing or not a regular file
    #[error("File: {} is not a file.", .path.display())]
    NotAFile {
        /// Offending path
        path: PathBuf,
    },

    /// Asset with the same name exists and overwrite is disabled
    #[error("Duplicate Asset: {name}.")]
    DuplicateAsset {
        /// Asset name
        name: String,
    },
}

/// Tag reference errors
#[derive(Error, Debug)]
pub enum TagError {
    /// The tag could not be moved and still points at another commit
    #[error("Tag '{tag}' points at {actual}, expected {expected}; refusing to release a stale commit")]
    StaleTag {
        /// Tag name
        tag: String,
        /// Commit the tag should point at
        expected: String,
        /// Commit the tag actually points at
        actual: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Api(ApiError::RateLimited { .. }) => vec![
                "Wait for the GitHub API rate limit to reset".to_string(),
                "Raise retry_count / retry_delay to ride out short limits".to_string(),
            ],
            ReleaseError::Api(ApiError::Unknown {
                status: Some(401), ..
            }) => vec![
                "Check that github_token (or GITHUB_TOKEN) is set and valid".to_string(),
            ],
            ReleaseError::Api(ApiError::Unknown {
                status: Some(403), ..
            }) => vec![
                "Grant the token 'contents: write' permission on the repository".to_string(),
            ],
            ReleaseError::Asset(AssetError::DuplicateAsset { .. }) => vec![
                "Set overwrite to replace the existing asset".to_string(),
                "Or use a different asset_name".to_string(),
            ],
            ReleaseError::Tag(TagError::StaleTag { tag, .. }) => vec![
                format!("Move tag '{tag}' manually or delete it before re-running"),
            ],
            ReleaseError::Config(ConfigError::ConflictingInputs { .. }) => vec![
                "Set at most one of tag_as_name / ref_as_name".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is worth retrying
    ///
    /// Configuration errors and local preconditions will not change on their own.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Config(_)
                | ReleaseError::Asset(_)
                | ReleaseError::Tag(_)
                | ReleaseError::Json(_)
        )
    }
}
