//! Release metadata overwrite.

use crate::error::Result;
use crate::github::{ReleaseApi, ReleaseDescriptor, ReleaseUpdate, Repository};

/// Write `update` onto release `release_id`, as given
///
/// Nothing is inferred here: the caller decides every flag (see
/// [`ReleaseRequest::update_for`](super::ReleaseRequest::update_for)). Publishing
/// (`draft: false`) notifies watchers on GitHub.
pub async fn update_release<C: ReleaseApi>(
    client: &C,
    repo: &Repository,
    release_id: u64,
    update: &ReleaseUpdate,
) -> Result<ReleaseDescriptor> {
    log::debug!("Updating release {}: {:?}", release_id, update);
    let updated = client.update_release(repo, release_id, update).await?;
    if !updated.draft {
        log::info!("Release {} is published at {}", updated.id, updated.html_url);
    }
    Ok(updated)
}
