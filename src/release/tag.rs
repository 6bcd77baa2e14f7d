//! Moving a release tag to a new commit.

use crate::error::{ConfigError, Result, TagError};
use crate::github::{ReleaseApi, Repository};
use regex::Regex;
use std::sync::LazyLock;

static COMMIT_HASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{40,64}$").unwrap_or_else(|e| panic!("invalid commit regex: {e}"))
});

/// What a target ref names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitTarget {
    /// A full SHA-1 or SHA-256 commit hash
    Commit(String),
    /// A branch whose tip must be looked up
    Branch(String),
}

impl CommitTarget {
    /// Classify a ref as a commit hash or a branch name
    pub fn classify(target_ref: &str) -> Self {
        if COMMIT_HASH.is_match(target_ref) {
            CommitTarget::Commit(target_ref.to_string())
        } else {
            CommitTarget::Branch(target_ref.to_string())
        }
    }

    /// Resolve to a commit hash, looking up branch tips remotely
    pub async fn resolve<C: ReleaseApi>(&self, client: &C, repo: &Repository) -> Result<String> {
        match self {
            CommitTarget::Commit(sha) => Ok(sha.clone()),
            CommitTarget::Branch(branch) => {
                let sha = client.get_branch_commit(repo, branch).await?;
                log::debug!("Branch {} resolved to {}", branch, sha);
                Ok(sha)
            }
        }
    }
}

/// Point `tags/<tag>` at `target_ref`
///
/// An `Unprocessable` rejection is tolerated: the tag is re-read and the move is
/// accepted if the tag is absent (release creation will create it at the target)
/// or already points at the target. A tag left on another commit is a
/// [`TagError::StaleTag`].
///
/// Returns the commit the tag should point at.
pub async fn move_tag<C: ReleaseApi>(
    client: &C,
    repo: &Repository,
    tag: &str,
    target_ref: Option<&str>,
) -> Result<String> {
    let target_ref = target_ref.ok_or_else(|| ConfigError::MissingInput {
        input: "ref (required when bump_tag is set)".to_string(),
    })?;

    let sha = CommitTarget::classify(target_ref).resolve(client, repo).await?;
    log::info!("Moving tag {} to {}", tag, sha);

    match client.update_tag_ref(repo, tag, &sha).await {
        Ok(()) => Ok(sha),
        Err(e) if e.is_unprocessable() => {
            log::warn!("Tag {} could not be updated ({}); verifying its target", tag, e);
            match client.get_tag_commit(repo, tag).await {
                Ok(actual) if actual == sha => Ok(sha),
                Ok(actual) => Err(TagError::StaleTag {
                    tag: tag.to_string(),
                    expected: sha,
                    actual,
                }
                .into()),
                Err(e) if e.is_not_found() => {
                    log::info!("Tag {} does not exist yet; it will be created with the release", tag);
                    Ok(sha)
                }
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_commit_hashes() {
        let sha1 = "0123456789abcdef0123456789abcdef01234567";
        assert_eq!(CommitTarget::classify(sha1), CommitTarget::Commit(sha1.to_string()));

        let sha256 = "A".repeat(64);
        assert_eq!(CommitTarget::classify(&sha256), CommitTarget::Commit(sha256.clone()));
    }

    #[test]
    fn test_classify_branches() {
        let too_short = "a".repeat(39);
        let too_long = "a".repeat(65);
        for name in ["main", "release/1.x", "deadbeef", too_short.as_str(), too_long.as_str()] {
            assert_eq!(CommitTarget::classify(name), CommitTarget::Branch(name.to_string()));
        }
        // 40 chars but not hex
        let not_hex = "g".repeat(40);
        assert_eq!(CommitTarget::classify(&not_hex), CommitTarget::Branch(not_hex.clone()));
    }
}
