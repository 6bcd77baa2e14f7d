//! Resolving CLI/CI inputs into one validated release configuration.
//!
//! Everything here runs before the first remote call, so every problem it finds
//! is a [`ConfigError`].

use crate::cli::Args;
use crate::error::{ConfigError, Result};
use crate::github::{DEFAULT_API_BASE, Repository};
use crate::release::ReleaseRequest;
use crate::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_SECONDS, RetryPolicy};
use crate::upload::{AssetSpec, resolve_assets};
use std::collections::HashMap;

const TAG_REF_PREFIX: &str = "refs/tags/";

/// Snapshot of the process environment
///
/// Empty values are treated as unset, matching how CI runners pass inputs.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a non-empty variable
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// GitHub token
    pub token: String,
    /// GitHub API endpoint
    pub api_base: String,
    /// Desired release state
    pub request: ReleaseRequest,
    /// Files to upload
    pub assets: Vec<AssetSpec>,
    /// Retry policy for uploads
    pub retry: RetryPolicy,
}

impl ReleaseConfig {
    /// Validate `args` against the environment and resolve every default
    pub fn resolve(args: &Args, env: &EnvConfig) -> Result<Self> {
        let tag_as_name = args.tag_as_name.unwrap_or(false);
        let ref_as_name = args.ref_as_name.unwrap_or(false);
        if tag_as_name && ref_as_name {
            return Err(ConfigError::ConflictingInputs {
                inputs: vec!["tag_as_name".to_string(), "ref_as_name".to_string()],
            }
            .into());
        }

        let retry = RetryPolicy::new(
            parse_number("retry_delay", args.retry_delay.as_deref(), DEFAULT_RETRY_DELAY_SECONDS)?,
            parse_number("retry_count", args.retry_count.as_deref(), DEFAULT_MAX_ATTEMPTS)?,
        );
        if retry.max_attempts > 1 && retry.delay().is_none() {
            log::warn!(
                "retry_delay {} is not positive; failed uploads will not be retried",
                retry.delay_seconds
            );
        }

        let tag = match non_empty(&args.tag).or_else(|| env.get("GITHUB_REF")) {
            Some(tag) => tag_name(&tag)?,
            None => {
                return Err(ConfigError::MissingInput {
                    input: "tag".to_string(),
                }
                .into());
            }
        };

        let repository = resolve_repository(args, env)?;
        let target_ref = non_empty(&args.target_ref);

        let release_name = if tag_as_name {
            tag.clone()
        } else if ref_as_name {
            target_ref.clone().ok_or_else(|| ConfigError::MissingInput {
                input: "ref (required when ref_as_name is set)".to_string(),
            })?
        } else {
            non_empty(&args.release_name).unwrap_or_else(|| tag.clone())
        };

        let file = non_empty(&args.file).ok_or_else(|| ConfigError::MissingInput {
            input: "file".to_string(),
        })?;
        let assets = resolve_assets(
            &file,
            args.asset_name.as_deref(),
            args.file_glob.unwrap_or(false),
            args.overwrite.unwrap_or(false),
        )?;

        let token = non_empty(&args.github_token)
            .or_else(|| env.get("GITHUB_TOKEN"))
            .or_else(|| env.get("GH_TOKEN"))
            .ok_or_else(|| ConfigError::MissingInput {
                input: "github_token (or GITHUB_TOKEN)".to_string(),
            })?;

        let request = ReleaseRequest {
            repository,
            tag,
            new_tag: non_empty(&args.new_tag),
            target_ref,
            release_name,
            notes: args.release_notes.clone(),
            delete_existing: args.delete_existing_release.unwrap_or(false),
            draft: args.draft,
            prerelease: args.prerelease,
            bump_tag: args.bump_tag.unwrap_or(false),
        };

        Ok(Self {
            token,
            api_base: env
                .get("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            request,
            assets,
            retry,
        })
    }
}

/// Reduce a structured ref (`refs/tags/v1.0.0`) to a bare tag name
pub fn tag_name(value: &str) -> Result<String> {
    let value = value.trim();
    if let Some(tag) = value.strip_prefix(TAG_REF_PREFIX) {
        return Ok(tag.to_string());
    }
    if value.starts_with("refs/") {
        return Err(ConfigError::InvalidValue {
            input: "tag".to_string(),
            reason: format!("'{value}' is not a tag ref"),
        }
        .into());
    }
    Ok(value.to_string())
}

fn resolve_repository(args: &Args, env: &EnvConfig) -> Result<Repository> {
    let from_env = env
        .get("GITHUB_REPOSITORY")
        .map(|value| parse_github_repo(&value))
        .transpose()?;

    let owner = non_empty(&args.owner)
        .or_else(|| from_env.as_ref().map(|r| r.owner.clone()))
        .ok_or_else(|| ConfigError::MissingInput {
            input: "owner (or GITHUB_REPOSITORY)".to_string(),
        })?;
    let name = non_empty(&args.repo)
        .or_else(|| from_env.map(|r| r.name))
        .ok_or_else(|| ConfigError::MissingInput {
            input: "repo (or GITHUB_REPOSITORY)".to_string(),
        })?;

    Ok(Repository::new(owner, name))
}

/// Parse an `owner/repo` string
fn parse_github_repo(value: &str) -> Result<Repository> {
    match value.split('/').collect::<Vec<_>>().as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Repository::new(*owner, *name)),
        _ => Err(ConfigError::InvalidValue {
            input: "GITHUB_REPOSITORY".to_string(),
            reason: format!("'{value}' is not in owner/repo form"),
        }
        .into()),
    }
}

fn parse_number(input: &str, value: Option<&str>, default: i64) -> Result<i64> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| {
            ConfigError::InvalidValue {
                input: input.to_string(),
                reason: format!("'{v}' is not a whole number"),
            }
            .into()
        }),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
