//! kodegen_release_upload - create or update a GitHub release and upload assets.
//!
//! Intended as a CI step triggered by a tag push.

use kodegen_release_upload::cli;
use kodegen_release_upload::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.indent(&format!("• {suggestion}"));
                }
            }

            process::exit(1);
        }
    }
}
