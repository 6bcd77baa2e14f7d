//! Find-or-create the release for a tag.

use super::ReleaseRequest;
use crate::error::{ApiResult, Result};
use crate::github::{ReleaseApi, ReleaseDescriptor, Repository};

/// Resolve the release for `request.tag`
///
/// Drafts count as existing releases.
///
/// - exists, `delete_existing` unset: reused untouched
/// - exists, `delete_existing` set: deleted, then created anew
/// - `NotFound`: created
/// - any other lookup failure: returned unchanged
pub async fn resolve_release<C: ReleaseApi>(
    client: &C,
    request: &ReleaseRequest,
) -> Result<ReleaseDescriptor> {
    let repo = &request.repository;

    match find_release(client, repo, &request.tag).await {
        Ok(existing) if !request.delete_existing => {
            log::info!(
                "Reusing release {} ({}) for tag {}",
                existing.id,
                existing.name,
                request.tag
            );
            Ok(existing)
        }
        Ok(existing) => {
            log::info!("Deleting existing release {} for tag {}", existing.id, request.tag);
            client.delete_release(repo, existing.id).await?;
            create(client, request).await
        }
        Err(e) if e.is_not_found() => {
            log::info!("No release for tag {} yet", request.tag);
            create(client, request).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Look a tag's release up, drafts included
///
/// The by-tag lookup only sees published releases, so a miss falls back to
/// scanning the release list before reporting `NotFound`.
async fn find_release<C: ReleaseApi>(
    client: &C,
    repo: &Repository,
    tag: &str,
) -> ApiResult<ReleaseDescriptor> {
    match client.get_release_by_tag(repo, tag).await {
        Err(e) if e.is_not_found() => {
            log::debug!("No published release for tag {}; checking drafts", tag);
            client
                .list_releases(repo)
                .await?
                .into_iter()
                .find(|release| release.tag_name == tag)
                .ok_or(e)
        }
        result => result,
    }
}

async fn create<C: ReleaseApi>(client: &C, request: &ReleaseRequest) -> Result<ReleaseDescriptor> {
    let new_release = request.new_release();
    let created = client
        .create_release(&request.repository, &new_release)
        .await?;
    log::info!(
        "Created {}release {} for tag {}",
        if created.draft { "draft " } else { "" },
        created.id,
        created.tag_name
    );
    Ok(created)
}
