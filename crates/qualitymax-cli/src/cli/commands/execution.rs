//! Direct access to single client operations.

use anyhow::Context;
use qualitymax_client::{ExecutionId, ExecutionResults, ExecutionStatus};

use super::super::args::{ExecutionArgs, OutputFormat, ResultsArgs, ValidateArgs};
use super::build_client;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS};

pub async fn cmd_validate(args: ValidateArgs) -> anyhow::Result<i32> {
    let client = build_client(&args.api)?;
    if client.validate_key().await {
        tracing::info!("API key is valid");
        Ok(SUCCESS)
    } else {
        tracing::error!("API key is invalid or the service is unreachable");
        Ok(CONFIG_ERROR)
    }
}

pub async fn cmd_status(args: ExecutionArgs) -> anyhow::Result<i32> {
    let client = build_client(&args.api)?;
    let id = ExecutionId::new(args.execution_id);
    let status = client
        .get_status(&id)
        .await
        .with_context(|| format!("status of execution {}", id))?;
    println!("{}", format_status(&status));
    Ok(SUCCESS)
}

pub async fn cmd_results(args: ResultsArgs) -> anyhow::Result<i32> {
    let client = build_client(&args.api)?;
    let id = ExecutionId::new(args.execution_id);
    let results = client
        .get_results(&id)
        .await
        .with_context(|| format!("results of execution {}", id))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => println!("{}", format_results(&results)),
    }
    Ok(SUCCESS)
}

pub async fn cmd_cancel(args: ExecutionArgs) -> anyhow::Result<i32> {
    let client = build_client(&args.api)?;
    client.cancel(&ExecutionId::new(args.execution_id)).await;
    Ok(SUCCESS)
}

fn format_status(status: &ExecutionStatus) -> String {
    let mut out = format!("Execution: {}\nStatus: {}", status.execution_id, status.status);
    if let Some(progress) = status.progress {
        out.push_str(&format!("\nProgress: {}%", progress));
    }
    if let (Some(done), Some(total)) = (status.completed_tests, status.total_tests) {
        out.push_str(&format!("\nTests: {}/{}", done, total));
    }
    if let (Some(passed), Some(failed)) = (status.passed_tests, status.failed_tests) {
        out.push_str(&format!(" ({} passed, {} failed)", passed, failed));
    }
    if let Some(test) = status.current_test.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&format!("\nRunning: {}", test));
    }
    if let Some(eta) = status.estimated_completion {
        out.push_str(&format!("\nEstimated completion: {}", eta.to_rfc3339()));
    }
    out
}

fn format_results(results: &ExecutionResults) -> String {
    let mut out = format!(
        "Execution: {}\nResult: {}\nTests: {}/{} passed, {} failed, {} skipped\nDuration: {}s",
        results.execution_id,
        results.result,
        results.passed_tests,
        results.total_tests,
        results.failed_tests,
        results.skipped_tests,
        results.duration_seconds.round()
    );
    for test in results.failed_cases() {
        out.push_str(&format!("\n  FAIL {}", test.test_name));
        if let Some(message) = &test.error_message {
            out.push_str(&format!(": {}", message));
        }
    }
    if !results.report_url.is_empty() {
        out.push_str(&format!("\nReport: {}", results.report_url));
    }
    out
}
