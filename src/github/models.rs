//! Release and asset types exchanged with the GitHub REST API.

use serde::{Deserialize, Serialize};

/// Release as seen by this tool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseDescriptor {
    /// Release ID
    pub id: u64,
    /// Display name (GitHub returns `null` for unnamed releases)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Tag the release is attached to
    pub tag_name: String,
    /// Upload locator for assets (URI template)
    pub upload_url: String,
    /// Release page URL
    #[serde(default)]
    pub html_url: String,
    /// Whether this is a draft
    pub draft: bool,
    /// Whether this is a prerelease
    pub prerelease: bool,
}

/// Asset attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetInfo {
    /// Asset ID
    pub id: u64,
    /// File name as shown on the release
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: String,
}

/// Payload for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag name (created at `target_commitish` if absent)
    pub tag_name: String,
    /// Commit or branch for a tag that does not exist yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    /// Release name
    pub name: String,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
}

/// Full metadata written by the release updater
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseUpdate {
    /// Release name
    pub name: String,
    /// Release notes; omitted leaves existing notes untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Tag name
    pub tag_name: String,
    /// Target commit or branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    /// Draft flag
    pub draft: bool,
    /// Prerelease flag
    pub prerelease: bool,
}

/// GitHub error body (`{"message": "..."}`)
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) message: String,
}

/// `GET /repos/{owner}/{repo}/branches/{branch}`
#[derive(Debug, Deserialize)]
pub(crate) struct BranchResponse {
    pub(crate) commit: CommitRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
    pub(crate) sha: String,
}

/// `GET /repos/{owner}/{repo}/git/ref/tags/{tag}` and `GET .../git/tags/{sha}`
#[derive(Debug, Deserialize)]
pub(crate) struct RefResponse {
    pub(crate) object: GitObject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitObject {
    pub(crate) sha: String,
    #[serde(rename = "type")]
    pub(crate) kind: String,
}

/// `PATCH /repos/{owner}/{repo}/git/refs/tags/{tag}`
#[derive(Debug, Serialize)]
pub(crate) struct UpdateRefRequest<'a> {
    pub(crate) sha: &'a str,
    pub(crate) force: bool,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
