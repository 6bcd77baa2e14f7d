//! Release reconciliation: tag moving, find-or-create, metadata update.
//!
//! The three steps run strictly in sequence and each one's failure aborts the
//! invocation:
//! - `tag`: optionally move `tags/<tag>` to the target commit
//! - `resolver`: reuse, replace, or create the release for the tag
//! - `updater`: overwrite the release metadata

mod resolver;
mod tag;
mod updater;

pub use resolver::resolve_release;
pub use tag::{CommitTarget, move_tag};
pub use updater::update_release;

use crate::github::{NewRelease, ReleaseDescriptor, ReleaseUpdate, Repository};

/// Desired release state for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Repository the release lives in
    pub repository: Repository,
    /// Tag the release is attached to
    pub tag: String,
    /// Rename the release's tag to this on update
    pub new_tag: Option<String>,
    /// Commit SHA or branch name the release (and a bumped tag) targets
    pub target_ref: Option<String>,
    /// Release display name
    pub release_name: String,
    /// Release notes (`None` keeps existing notes)
    pub notes: Option<String>,
    /// Replace an existing release for the tag instead of reusing it
    pub delete_existing: bool,
    /// Draft flag, `None` when not explicitly configured
    pub draft: Option<bool>,
    /// Prerelease flag, `None` when not explicitly configured
    pub prerelease: Option<bool>,
    /// Move the tag to `target_ref` before releasing
    pub bump_tag: bool,
}

impl ReleaseRequest {
    /// Minimal request for a tag, named after the tag
    pub fn new(repository: Repository, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            repository,
            release_name: tag.clone(),
            tag,
            new_tag: None,
            target_ref: None,
            notes: None,
            delete_existing: false,
            draft: None,
            prerelease: None,
            bump_tag: false,
        }
    }

    /// Payload used when the release has to be created
    ///
    /// Flags that were not configured default to `false`.
    pub fn new_release(&self) -> NewRelease {
        NewRelease {
            tag_name: self.tag.clone(),
            target_commitish: self.target_ref.clone(),
            name: self.release_name.clone(),
            draft: self.draft.unwrap_or(false),
            prerelease: self.prerelease.unwrap_or(false),
        }
    }

    /// Full metadata to write onto `current`
    ///
    /// Flags that were not configured carry forward the release's current value.
    pub fn update_for(&self, current: &ReleaseDescriptor) -> ReleaseUpdate {
        ReleaseUpdate {
            name: self.release_name.clone(),
            body: self.notes.clone(),
            tag_name: self.new_tag.clone().unwrap_or_else(|| self.tag.clone()),
            target_commitish: self.target_ref.clone(),
            draft: self.draft.unwrap_or(current.draft),
            prerelease: self.prerelease.unwrap_or(current.prerelease),
        }
    }
}
