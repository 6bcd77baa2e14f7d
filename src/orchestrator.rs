//! End-to-end release run: tag → release → metadata → assets.

use crate::error::Result;
use crate::github::{ReleaseApi, ReleaseDescriptor};
use crate::release::{ReleaseRequest, move_tag, resolve_release, update_release};
use crate::retry::RetryPolicy;
use crate::upload::{AssetSpec, UploadResult, upload_assets};

/// Outcome of a run whose release phase succeeded
#[derive(Debug)]
pub struct ReleaseReport {
    /// Release after the metadata update
    pub release: ReleaseDescriptor,
    /// One settled result per asset, in input order
    pub uploads: Vec<UploadResult>,
}

impl ReleaseReport {
    /// Check if every asset was uploaded
    pub fn is_success(&self) -> bool {
        self.uploads.iter().all(UploadResult::is_uploaded)
    }

    /// Uploads that failed
    pub fn failures(&self) -> impl Iterator<Item = &UploadResult> {
        self.uploads.iter().filter(|upload| !upload.is_uploaded())
    }
}

/// Reconcile the release described by `request` and attach `assets`
///
/// Tag move, release resolution and metadata update run in order; the first
/// failure among them is returned as `Err` and nothing further happens. Asset
/// uploads never make this return `Err`: their outcomes are in the report.
pub async fn run_release<C: ReleaseApi>(
    client: &C,
    request: &ReleaseRequest,
    assets: &[AssetSpec],
    policy: &RetryPolicy,
) -> Result<ReleaseReport> {
    let repo = &request.repository;

    if request.bump_tag {
        move_tag(client, repo, &request.tag, request.target_ref.as_deref()).await?;
    }

    let resolved = resolve_release(client, request).await?;
    let update = request.update_for(&resolved);
    let release = update_release(client, repo, resolved.id, &update).await?;

    log::info!(
        "Uploading {} asset(s) to release {} ({})",
        assets.len(),
        release.id,
        release.tag_name
    );
    let uploads = upload_assets(client, repo, &release, assets, policy).await;

    Ok(ReleaseReport { release, uploads })
}
