pub mod comment;
pub mod context;
pub mod markdown;
pub mod outputs;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Context;

pub use context::GithubEnv;

/// Append to the job summary file (`GITHUB_STEP_SUMMARY`).
pub fn append_step_summary(path: &Path, markdown: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open GITHUB_STEP_SUMMARY at {}", path.display()))?;
    writeln!(file, "{}", markdown).context("failed to write job summary")?;
    Ok(())
}

/// `::error::` workflow command; the runner turns it into an annotation.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_command_data(message))
}

fn escape_command_data(input: &str) -> String {
    input
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
