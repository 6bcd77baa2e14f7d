//! GitHub integration for release operations
//!
//! [`ReleaseApi`] is the seam between the reconciliation logic and the hosting
//! service. [`GitHubClient`] implements it over the REST API; tests substitute
//! an in-memory implementation.

mod client;
mod models;

pub use client::{DEFAULT_API_BASE, GitHubClient};
pub use models::{AssetInfo, NewRelease, ReleaseDescriptor, ReleaseUpdate};

use crate::error::ApiResult;
use bytes::Bytes;
use std::fmt;
use std::future::Future;

/// Repository coordinates (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl Repository {
    /// Create repository coordinates
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Remote operations needed to reconcile a release and its assets
///
/// Every failure is reported as a classified [`ApiError`](crate::error::ApiError).
pub trait ReleaseApi {
    /// Fetch the published release for a tag (`NotFound` if there is none)
    ///
    /// Draft releases are not visible through this lookup; see
    /// [`list_releases`](Self::list_releases).
    fn get_release_by_tag(
        &self,
        repo: &Repository,
        tag: &str,
    ) -> impl Future<Output = ApiResult<ReleaseDescriptor>>;

    /// List every release of the repository, drafts included
    fn list_releases(
        &self,
        repo: &Repository,
    ) -> impl Future<Output = ApiResult<Vec<ReleaseDescriptor>>>;

    /// Create a release
    fn create_release(
        &self,
        repo: &Repository,
        release: &NewRelease,
    ) -> impl Future<Output = ApiResult<ReleaseDescriptor>>;

    /// Overwrite release metadata
    fn update_release(
        &self,
        repo: &Repository,
        release_id: u64,
        update: &ReleaseUpdate,
    ) -> impl Future<Output = ApiResult<ReleaseDescriptor>>;

    /// Delete a release (the tag itself is kept)
    fn delete_release(
        &self,
        repo: &Repository,
        release_id: u64,
    ) -> impl Future<Output = ApiResult<()>>;

    /// List the assets attached to a release
    fn list_assets(
        &self,
        repo: &Repository,
        release_id: u64,
    ) -> impl Future<Output = ApiResult<Vec<AssetInfo>>>;

    /// Delete a release asset
    fn delete_asset(&self, repo: &Repository, asset_id: u64)
    -> impl Future<Output = ApiResult<()>>;

    /// Upload raw bytes as a named asset to a release's upload target
    fn upload_asset(
        &self,
        upload_url: &str,
        asset_name: &str,
        content: Bytes,
    ) -> impl Future<Output = ApiResult<AssetInfo>>;

    /// Resolve a branch to its tip commit hash
    fn get_branch_commit(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> impl Future<Output = ApiResult<String>>;

    /// Point `tags/<tag>` at a commit (no force: move-forward only)
    fn update_tag_ref(
        &self,
        repo: &Repository,
        tag: &str,
        sha: &str,
    ) -> impl Future<Output = ApiResult<()>>;

    /// Commit `tags/<tag>` currently points at (`NotFound` if the tag is absent)
    fn get_tag_commit(
        &self,
        repo: &Repository,
        tag: &str,
    ) -> impl Future<Output = ApiResult<String>>;
}
