//! Release asset upload.
//!
//! Each file is checked locally, then listed/deleted/uploaded against the
//! release under its own retry budget. All files upload concurrently and every
//! upload is awaited to completion; one failure never cancels its siblings.

mod files;

pub use files::{AssetSpec, resolve_assets};

use crate::error::{AssetError, ReleaseError, Result};
use crate::github::{AssetInfo, ReleaseApi, ReleaseDescriptor, Repository};
use crate::retry::{RetryPolicy, retry};
use bytes::Bytes;
use futures_util::future::join_all;
use std::path::PathBuf;

/// Settled outcome of one asset upload
#[derive(Debug)]
pub enum UploadStatus {
    /// Asset is on the release
    Uploaded(AssetInfo),
    /// Upload failed for good
    Failed(ReleaseError),
}

/// Result of uploading one [`AssetSpec`]
#[derive(Debug)]
pub struct UploadResult {
    /// Name of the asset on the release
    pub asset_name: String,
    /// Local file
    pub path: PathBuf,
    /// How the upload settled
    pub status: UploadStatus,
}

impl UploadResult {
    /// Check if the asset made it onto the release
    pub fn is_uploaded(&self) -> bool {
        matches!(self.status, UploadStatus::Uploaded(_))
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&ReleaseError> {
        match &self.status {
            UploadStatus::Failed(e) => Some(e),
            UploadStatus::Uploaded(_) => None,
        }
    }
}

/// Upload one file as a release asset
///
/// Fails with [`AssetError::NotAFile`] without touching the release if the path
/// is not a regular file. The remote part (list, replace-or-reject, upload) is
/// retried per `policy`; a name collision without `overwrite` is
/// [`AssetError::DuplicateAsset`] and is never retried.
pub async fn upload_asset<C: ReleaseApi>(
    client: &C,
    repo: &Repository,
    release: &ReleaseDescriptor,
    spec: &AssetSpec,
    policy: &RetryPolicy,
) -> Result<AssetInfo> {
    let is_file = tokio::fs::metadata(&spec.path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(AssetError::NotAFile {
            path: spec.path.clone(),
        }
        .into());
    }

    let content = Bytes::from(tokio::fs::read(&spec.path).await?);
    let operation_name = format!("Upload of {}", spec.asset_name);

    retry(
        || upload_once(client, repo, release, spec, content.clone()),
        policy,
        &operation_name,
    )
    .await
}

async fn upload_once<C: ReleaseApi>(
    client: &C,
    repo: &Repository,
    release: &ReleaseDescriptor,
    spec: &AssetSpec,
    content: Bytes,
) -> Result<AssetInfo> {
    let existing = client.list_assets(repo, release.id).await?;

    if let Some(duplicate) = existing.iter().find(|asset| asset.name == spec.asset_name) {
        if !spec.overwrite {
            return Err(AssetError::DuplicateAsset {
                name: spec.asset_name.clone(),
            }
            .into());
        }
        log::info!("Replacing existing asset {} ({})", duplicate.name, duplicate.id);
        client.delete_asset(repo, duplicate.id).await?;
    }

    let size = content.len();
    let asset = client
        .upload_asset(&release.upload_url, &spec.asset_name, content)
        .await?;
    log::info!("Uploaded {} ({} bytes)", asset.name, size);
    Ok(asset)
}

/// Upload every [`AssetSpec`] concurrently and wait for all of them to settle
///
/// Results come back in the order of `specs`.
pub async fn upload_assets<C: ReleaseApi>(
    client: &C,
    repo: &Repository,
    release: &ReleaseDescriptor,
    specs: &[AssetSpec],
    policy: &RetryPolicy,
) -> Vec<UploadResult> {
    let uploads = specs.iter().map(|spec| async move {
        let status = match upload_asset(client, repo, release, spec, policy).await {
            Ok(asset) => UploadStatus::Uploaded(asset),
            Err(e) => {
                log::error!("Failed to upload {}: {}", spec.asset_name, e);
                UploadStatus::Failed(e)
            }
        };
        UploadResult {
            asset_name: spec.asset_name.clone(),
            path: spec.path.clone(),
            status,
        }
    });

    join_all(uploads).await
}
