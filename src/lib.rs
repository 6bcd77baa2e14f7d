//! # Kodegen Release Upload
//!
//! Idempotent GitHub release reconciliation and asset upload for CI pipelines.
//!
//! Given a tag, the desired release metadata and a set of local files, this
//! crate finds or creates the release for the tag, optionally moves the tag to
//! a new commit first, overwrites the release metadata, and uploads every file
//! as a release asset.
//!
//! ## Features
//!
//! - **Idempotent**: re-running reuses the release for the tag unless asked to replace it
//! - **Tag bumping**: move a tag to a commit or branch tip before releasing
//! - **Duplicate handling**: reject or overwrite assets that already exist
//! - **Per-file retry**: each upload has its own retry budget
//! - **Concurrent uploads**: every file is uploaded at once; one failure never stops the rest
//!
//! ## Usage
//!
//! ```bash
//! kodegen_release_upload --tag v1.0.0 --file dist/app.tar.gz
//! kodegen_release_upload --file 'dist/*' --file-glob --overwrite --retry-count 3
//! ```
//!
//! The library entry point is [`run_release`], which takes any [`ReleaseApi`]
//! implementation; [`GitHubClient`] is the one talking to GitHub.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod orchestrator;
pub mod release;
pub mod retry;
pub mod upload;

// Re-export main types for public API
pub use cli::Args;
pub use config::{EnvConfig, ReleaseConfig};
pub use error::{ApiError, AssetError, ConfigError, ReleaseError, Result, TagError};
pub use github::{
    AssetInfo, GitHubClient, NewRelease, ReleaseApi, ReleaseDescriptor, ReleaseUpdate, Repository,
};
pub use orchestrator::{ReleaseReport, run_release};
pub use release::ReleaseRequest;
pub use retry::{RetryPolicy, retry};
pub use upload::{AssetSpec, UploadResult, UploadStatus, resolve_assets};
