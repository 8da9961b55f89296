//! Step outputs (`GITHUB_OUTPUT`).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use qualitymax_client::ExecutionResults;

/// Step outputs in the order the action declares them.
pub fn action_outputs(results: &ExecutionResults) -> Vec<(&'static str, String)> {
    vec![
        ("execution-id", results.execution_id.to_string()),
        ("status", results.result.to_string()),
        ("total-tests", results.total_tests.to_string()),
        ("passed-tests", results.passed_tests.to_string()),
        ("failed-tests", results.failed_tests.to_string()),
        ("duration-seconds", results.duration_seconds.to_string()),
        ("report-url", results.report_url.clone()),
        (
            "summary-markdown",
            results.summary_markdown.clone().unwrap_or_default(),
        ),
    ]
}

/// Append outputs as heredoc records. Values may span lines.
pub fn write_outputs(path: &Path, outputs: &[(&str, String)]) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open GITHUB_OUTPUT at {}", path.display()))?;

    for (name, value) in outputs {
        file.write_all(format_record(name, value).as_bytes())
            .with_context(|| format!("failed to write output {}", name))?;
    }
    Ok(())
}

fn format_record(name: &str, value: &str) -> String {
    let mut delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    while value.contains(&delimiter) {
        delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}
