//! Command line argument parsing.
//!
//! Every input can also come from the GitHub Actions `INPUT_<NAME>` environment
//! variable, so the binary runs unchanged as an action step.

use clap::Parser;
use clap::builder::BoolishValueParser;

/// Create or update a GitHub release and upload files to it
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "kodegen_release_upload",
    version,
    about = "Create or update a GitHub release and upload files to it",
    long_about = "Create or update a GitHub release and upload build artifacts to it.

Usage:
  kodegen_release_upload --tag v1.0.0 --file target/dist/app.tar.gz
  kodegen_release_upload --file 'target/dist/*' --file-glob --overwrite
  kodegen_release_upload --tag nightly --ref main --bump-tag --prerelease

Inputs fall back to INPUT_<NAME> environment variables, GITHUB_TOKEN,
GITHUB_REPOSITORY and GITHUB_REF."
)]
pub struct Args {
    /// GitHub token with contents:write permission
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Repository owner (default: from GITHUB_REPOSITORY)
    #[arg(long, env = "INPUT_OWNER")]
    pub owner: Option<String>,

    /// Repository name (default: from GITHUB_REPOSITORY)
    #[arg(long, env = "INPUT_REPO")]
    pub repo: Option<String>,

    /// Tag to release; `refs/tags/<name>` is accepted (default: GITHUB_REF)
    #[arg(long, env = "INPUT_TAG")]
    pub tag: Option<String>,

    /// Rename the release's tag when updating it
    #[arg(long, env = "INPUT_NEW_TAG")]
    pub new_tag: Option<String>,

    /// Commit SHA or branch the release targets
    #[arg(long = "ref", env = "INPUT_REF")]
    pub target_ref: Option<String>,

    /// Release name (default: the tag)
    #[arg(long, env = "INPUT_RELEASE_NAME")]
    pub release_name: Option<String>,

    /// Release notes
    #[arg(long, env = "INPUT_RELEASE_NOTES")]
    pub release_notes: Option<String>,

    /// File to upload, or a pattern with --file-glob
    #[arg(long, env = "INPUT_FILE")]
    pub file: Option<String>,

    /// Asset name for a single file (default: the file's base name)
    #[arg(long, env = "INPUT_ASSET_NAME")]
    pub asset_name: Option<String>,

    /// Treat --file as a glob pattern
    #[arg(long, env = "INPUT_FILE_GLOB", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub file_glob: Option<bool>,

    /// Replace assets that already exist with the same name
    #[arg(long, env = "INPUT_OVERWRITE", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub overwrite: Option<bool>,

    /// Delete an existing release for the tag and create a fresh one
    #[arg(long, env = "INPUT_DELETE_EXISTING_RELEASE", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub delete_existing_release: Option<bool>,

    /// Draft flag (unset: keep the release's current value)
    #[arg(long, env = "INPUT_DRAFT", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub draft: Option<bool>,

    /// Prerelease flag (unset: keep the release's current value)
    #[arg(long, env = "INPUT_PRERELEASE", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub prerelease: Option<bool>,

    /// Move the tag to --ref before releasing
    #[arg(long, env = "INPUT_BUMP_TAG", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub bump_tag: Option<bool>,

    /// Name the release after the tag
    #[arg(long, env = "INPUT_TAG_AS_NAME", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub tag_as_name: Option<bool>,

    /// Name the release after --ref
    #[arg(long, env = "INPUT_REF_AS_NAME", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub ref_as_name: Option<bool>,

    /// Upload attempts per file (default: 0, a single attempt)
    #[arg(long, env = "INPUT_RETRY_COUNT")]
    pub retry_count: Option<String>,

    /// Seconds between upload attempts (default: 5)
    #[arg(long, env = "INPUT_RETRY_DELAY")]
    pub retry_delay: Option<String>,

    /// Print per-asset details
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_flags_accept_bare_and_explicit_values() {
        let args = Args::try_parse_from([
            "kodegen_release_upload",
            "--overwrite",
            "--draft",
            "false",
            "--file-glob=yes",
        ])
        .unwrap();

        assert_eq!(args.overwrite, Some(true));
        assert_eq!(args.draft, Some(false));
        assert_eq!(args.file_glob, Some(true));
        assert_eq!(args.prerelease, None);
    }

    #[test]
    fn test_ref_flag() {
        let args =
            Args::try_parse_from(["kodegen_release_upload", "--ref", "main", "--bump-tag"]).unwrap();
        assert_eq!(args.target_ref.as_deref(), Some("main"));
        assert_eq!(args.bump_tag, Some(true));
    }
}
