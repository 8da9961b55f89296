//! `qualitymax run`: the CI entry point.

use std::time::Duration;

use anyhow::Context;
use qualitymax_client::{
    CiContext, ExecutionClient, ExecutionError, ExecutionId, ExecutionRequest, ExecutionResults,
    TestOutcome,
};
use tracing::{debug, error, info, warn};

use super::super::args::RunArgs;
use super::build_client;
use super::project::resolve_project_id;
use crate::exit_codes::{SUCCESS, TESTS_FAILED};
use crate::github::comment::{post_pr_comment, CommentTarget};
use crate::github::{self, markdown, outputs, GithubEnv};

const RULE: &str = "═══════════════════════════════════════";

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let gh = GithubEnv::from_env();
    let timeout = Duration::from_secs(u64::from(args.timeout_minutes) * 60);

    let result = match build_client(&args.api) {
        Ok(client) => run_with_client(&args, &gh, &client, timeout).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        if gh.in_actions {
            println!("{}", github::error_command(&format!("{e:#}")));
        }
    }
    result
}

/// Cancels the in-flight execution when the run fails before its results are in.
/// A timed-out execution was already cancelled by the poller.
async fn run_with_client(
    args: &RunArgs,
    gh: &GithubEnv,
    client: &ExecutionClient,
    timeout: Duration,
) -> anyhow::Result<i32> {
    let mut active: Option<ExecutionId> = None;
    let result = drive(args, gh, client, timeout, &mut active).await;

    if result.is_err() {
        if let Some(id) = active.take() {
            client.cancel(&id).await;
        }
    }
    result
}

async fn drive(
    args: &RunArgs,
    gh: &GithubEnv,
    client: &ExecutionClient,
    timeout: Duration,
    active: &mut Option<ExecutionId>,
) -> anyhow::Result<i32> {
    info!("QualityMax Test Runner");
    info!(
        "Project: {}",
        args.project_id
            .as_deref()
            .or(args.project_name.as_deref())
            .unwrap_or("(auto-detect)")
    );
    info!("Test Suite: {}", args.test_suite);
    info!("Browser: {}", qualitymax_client::Browser::from(args.browser));

    info!("Validating API key...");
    if !client.validate_key().await {
        anyhow::bail!("Invalid API key. Get your API key from app.qualitymax.ai/settings/api");
    }
    info!("API key validated");

    let ctx = gh.ci_context();
    let project_id = resolve_project_id(
        client,
        args.project_id.as_deref(),
        args.project_name.as_deref(),
        &ctx.repository,
    )
    .await?;

    let request = build_request(args, project_id, ctx.clone());
    let started = client.trigger(&request).await?;
    let id = started.execution_id.clone();
    *active = Some(id.clone());

    info!("Execution started: {}", id);
    if let Some(estimate) = started.estimated_duration() {
        info!(
            "Estimated duration: {} minutes",
            (estimate.as_secs_f64() / 60.0).round()
        );
    }

    let results = match client.wait_for_completion(&id, timeout).await {
        Ok(results) => results,
        Err(e @ ExecutionError::Timeout { .. }) => {
            active.take();
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    active.take();

    publish(args, gh, &ctx, &results).await?;
    log_result_box(&results);

    if results.result == TestOutcome::Failed && args.fail_on_test_failure {
        let headline = markdown::result_headline(&results);
        error!("{}", headline);
        if gh.in_actions {
            println!("{}", github::error_command(&headline));
        }
        return Ok(TESTS_FAILED);
    }
    if results.passed() {
        info!("{}", markdown::result_headline(&results));
    }
    Ok(SUCCESS)
}

pub(crate) fn build_request(
    args: &RunArgs,
    project_id: String,
    ctx: CiContext,
) -> ExecutionRequest {
    let mut request = ExecutionRequest::new(project_id, ctx);
    request.test_suite = Some(args.test_suite.clone());
    request.test_ids = args.test_ids.as_ref().map(|ids| ids.0.clone());
    request.base_url = args
        .base_url
        .clone()
        .filter(|url| !url.trim().is_empty());
    request.browser = Some(args.browser.into());
    request.headless = Some(args.headless);
    request.timeout_minutes = Some(args.timeout_minutes);
    if !args.vars.is_empty() {
        request.variables = Some(args.vars.iter().cloned().collect());
    }
    request
}

/// Step outputs, job summary and PR comment.
async fn publish(
    args: &RunArgs,
    gh: &GithubEnv,
    ctx: &CiContext,
    results: &ExecutionResults,
) -> anyhow::Result<()> {
    let values = outputs::action_outputs(results);
    match &gh.output_path {
        Some(path) => outputs::write_outputs(path, &values).context("setting step outputs")?,
        None => {
            for (name, value) in &values {
                debug!(output = *name, "{}", value);
            }
        }
    }

    if let Some(path) = &gh.summary_path {
        if let Err(e) = github::append_step_summary(path, &markdown::job_summary(results)) {
            warn!("Failed to write job summary: {e:#}");
        }
    }

    if args.post_pr_comment {
        comment_on_pr(gh, ctx, results).await;
    }
    Ok(())
}

async fn comment_on_pr(gh: &GithubEnv, ctx: &CiContext, results: &ExecutionResults) {
    let Some(pr_number) = ctx.pr_number else {
        debug!("Not a PR, skipping comment");
        return;
    };
    let Some(token) = gh.token.as_deref() else {
        warn!(
            "GITHUB_TOKEN not available, cannot post PR comment. \
             Add `env: GITHUB_TOKEN: ${{{{ secrets.GITHUB_TOKEN }}}}` to your workflow."
        );
        return;
    };
    let Some((owner, repo)) = gh.owner_repo() else {
        warn!("GITHUB_REPOSITORY not set, cannot post PR comment");
        return;
    };

    let target = CommentTarget {
        api_url: &gh.api_url,
        owner,
        repo,
        pr_number,
    };
    match post_pr_comment(&target, token, &markdown::comment_body(results)).await {
        Ok(()) => info!("Posted test results to PR #{}", pr_number),
        Err(e) => warn!("Failed to post PR comment: {e:#}"),
    }
}

fn log_result_box(results: &ExecutionResults) {
    info!("");
    info!("{}", RULE);
    info!(
        "  Tests: {}/{} passed",
        results.passed_tests, results.total_tests
    );
    info!("  Duration: {}s", results.duration_seconds.round());
    info!("  Report: {}", results.report_url);
    info!("{}", RULE);
    info!("");
}
