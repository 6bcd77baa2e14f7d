//! Command execution: resolve configuration, run the release, report.

use crate::cli::{Args, OutputManager};
use crate::config::{EnvConfig, ReleaseConfig};
use crate::error::Result;
use crate::github::GitHubClient;
use crate::orchestrator::{ReleaseReport, run_release};
use crate::upload::UploadStatus;
use std::fs::OpenOptions;
use std::io::Write;

/// Value of the `result` output on success
pub const RESULT_SUCCESS: &str = "success";
/// Value of the `result` output on failure
pub const RESULT_FAILURE: &str = "failure";

/// Run the release described by `args` and return the process exit code
///
/// Every failure is reported here; `Err` is only returned when the `result`
/// output itself cannot be written.
pub async fn execute_command(args: Args, env: &EnvConfig) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.quiet);

    let succeeded = match execute_release(&args, env, &output).await {
        Ok(report) => report_uploads(&report, &output),
        Err(e) => {
            output.error(&format!("Release failed: {e}"));
            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.indent(&format!("• {suggestion}"));
                }
            }
            false
        }
    };

    let result = if succeeded { RESULT_SUCCESS } else { RESULT_FAILURE };
    write_output(env, "result", result)?;

    Ok(if succeeded { 0 } else { 1 })
}

async fn execute_release(
    args: &Args,
    env: &EnvConfig,
    output: &OutputManager,
) -> Result<ReleaseReport> {
    let config = ReleaseConfig::resolve(args, env)?;
    let request = &config.request;

    output.section(&format!("Release {} on {}", request.tag, request.repository));
    output.verbose(&format!("API: {}", config.api_base));
    output.verbose(&format!(
        "Retry: {} attempt(s), {}s apart",
        config.retry.max_attempts.max(1),
        config.retry.delay_seconds
    ));
    if config.retry.max_attempts > 1 && config.retry.delay().is_none() {
        output.warn("retry_delay is not positive; failed uploads will not be retried");
    }

    let client = GitHubClient::with_api_base(&config.token, &config.api_base)?;

    if request.bump_tag {
        output.info(&format!(
            "Moving tag {} to {}",
            request.tag,
            request.target_ref.as_deref().unwrap_or("?")
        ));
    }
    output.info(&format!("Uploading {} file(s)", config.assets.len()));

    let report = run_release(&client, request, &config.assets, &config.retry).await?;
    output.success(&format!(
        "Release {} ready{}",
        report.release.tag_name,
        if report.release.draft { " (draft)" } else { "" }
    ));
    if !report.release.html_url.is_empty() {
        output.indent(&report.release.html_url);
    }

    Ok(report)
}

/// Print one line per upload; true if all of them succeeded
fn report_uploads(report: &ReleaseReport, output: &OutputManager) -> bool {
    for upload in &report.uploads {
        match &upload.status {
            UploadStatus::Uploaded(asset) => {
                output.success(&format!("Uploaded {} ({} bytes)", asset.name, asset.size));
                if !asset.browser_download_url.is_empty() {
                    output.verbose(&asset.browser_download_url);
                }
            }
            UploadStatus::Failed(e) => {
                output.error(&format!("{} ({}): {e}", upload.asset_name, upload.path.display()));
            }
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        output.error(&format!("{failed} of {} upload(s) failed", report.uploads.len()));
        return false;
    }
    true
}

/// Append `name=value` to the file named by `GITHUB_OUTPUT`, if any
fn write_output(env: &EnvConfig, name: &str, value: &str) -> Result<()> {
    match env.get("GITHUB_OUTPUT") {
        Some(path) => {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{name}={value}")?;
        }
        None => log::info!("{}={}", name, value),
    }
    Ok(())
}
