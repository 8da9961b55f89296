//! Execution client for the test-execution API.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ExecutionError, ExecutionResult};
use crate::progress::{log_progress_sink, ProgressSink, ProgressTracker};
use crate::types::{
    ExecutionId, ExecutionRequest, ExecutionResults, ExecutionStatus, Project, ProjectsResponse,
    ResolveProjectResponse, TriggerResponse, ValidateResponse,
};

mod http;

use http::{
    cancel_outcome, expect_success, resolve_outcome, Call, CancelOutcome, HttpBackend,
    ResolveOutcome,
};

pub const CLIENT_USER_AGENT: &str = concat!("qualitymax-client/", env!("CARGO_PKG_VERSION"));

const API_KEY_HEADER: &str = "x-api-key";

/// Remote-control client for one account's test executions.
#[derive(Clone)]
pub struct ExecutionClient {
    http: HttpBackend,
    poll_interval: Duration,
    progress: ProgressSink,
}

impl std::fmt::Debug for ExecutionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionClient")
            .field("base_url", &self.http.base_url)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl ExecutionClient {
    pub fn new(config: ClientConfig) -> ExecutionResult<Self> {
        config.validate()?;

        let mut api_key =
            HeaderValue::from_str(config.api_key.trim()).map_err(|e| ExecutionError::Config {
                message: format!("API key is not a valid header value: {}", e),
            })?;
        api_key.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(API_KEY_HEADER, api_key);
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(default_headers)
            .build()
            .map_err(|e| ExecutionError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                base_url: config.base_url().to_string(),
            },
            poll_interval: config.poll_interval(),
            progress: log_progress_sink(),
        })
    }

    pub fn from_env() -> ExecutionResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Replace the default (logging) progress sink.
    pub fn with_progress_sink(mut self, sink: ProgressSink) -> Self {
        self.progress = sink;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    /// Best-effort key check. Any failure reads as "invalid".
    pub async fn validate_key(&self) -> bool {
        let response = match self.http.get("/github-action/validate", &[]).await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "API key validation failed");
                return false;
            }
        };

        match serde_json::from_str::<ValidateResponse>(&response.body) {
            Ok(body) => body.valid,
            Err(e) => {
                debug!(error = %e, status = %response.status, "API key validation failed");
                false
            }
        }
    }

    /// Start a run. The returned `execution_id` is the handle for every later call.
    pub async fn trigger(&self, request: &ExecutionRequest) -> ExecutionResult<TriggerResponse> {
        info!("Triggering tests for project {}...", request.project_id);

        let response = self
            .http
            .post("/github-action/trigger", Some(request))
            .await?;
        let body = expect_success(Call::Trigger, response)?;
        let data: TriggerResponse = decode(&body, "trigger response")?;

        if !data.success {
            return Err(ExecutionError::Trigger {
                message: data.message,
            });
        }
        if data.execution_id.is_empty() {
            return Err(ExecutionError::InvalidResponse {
                message: "trigger response is missing execution_id".to_string(),
            });
        }

        info!("Tests queued with execution ID: {}", data.execution_id);
        Ok(data)
    }

    pub async fn get_status(&self, id: &ExecutionId) -> ExecutionResult<ExecutionStatus> {
        let response = self
            .http
            .get(&format!("/github-action/status/{}", id), &[])
            .await?;
        let body = expect_success(Call::Status(id), response)?;
        decode(&body, "status response")
    }

    pub async fn get_results(&self, id: &ExecutionId) -> ExecutionResult<ExecutionResults> {
        let response = self
            .http
            .get(
                &format!("/github-action/results/{}", id),
                &[("include_markdown", "true")],
            )
            .await?;
        let body = expect_success(Call::Results(id), response)?;
        decode(&body, "results response")
    }

    /// Best-effort cancel. Failures are logged as warnings and never returned.
    pub async fn cancel(&self, id: &ExecutionId) {
        info!("Cancelling execution {}...", id);

        let response = match self
            .http
            .post::<()>(&format!("/github-action/cancel/{}", id), None)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(execution_id = %id, "Failed to cancel execution: {}", e);
                return;
            }
        };

        match cancel_outcome(response) {
            CancelOutcome::Cancelled => info!("Execution cancelled"),
            CancelOutcome::Rejected(message) => {
                warn!(execution_id = %id, "Failed to cancel execution: {}", message)
            }
        }
    }

    /// Poll until the execution reaches a terminal state, then fetch its results.
    ///
    /// Polls at the configured fixed interval. When `timeout` elapses first the
    /// execution is cancelled and [`ExecutionError::Timeout`] is returned.
    pub async fn wait_for_completion(
        &self,
        id: &ExecutionId,
        timeout: Duration,
    ) -> ExecutionResult<ExecutionResults> {
        let start = Instant::now();
        let mut tracker = ProgressTracker::default();

        info!("Waiting for test execution to complete...");

        while start.elapsed() < timeout {
            let status = self.get_status(id).await?;
            debug!(execution_id = %id, state = %status.status, "polled execution");

            if let Some(event) = tracker.observe(&status) {
                (self.progress)(&event);
            }

            if status.status.is_terminal() {
                info!("Execution finished with status: {}", status.status);
                return self.get_results(id).await;
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        warn!("Execution timeout reached, attempting to cancel...");
        self.cancel(id).await;
        Err(ExecutionError::Timeout { timeout })
    }

    /// Projects visible to the API key.
    pub async fn list_projects(&self) -> ExecutionResult<Vec<Project>> {
        let response = self.http.get("/github-action/projects", &[]).await?;
        let body = expect_success(Call::Projects, response)?;
        let data: ProjectsResponse = decode(&body, "projects response")?;
        Ok(data.projects)
    }

    /// Project linked to a repository (`owner/repo`), if any.
    pub async fn resolve_project(&self, repository: &str) -> ExecutionResult<Option<String>> {
        let response = self
            .http
            .get(
                "/github-action/resolve-project",
                &[("repository", repository)],
            )
            .await?;

        match resolve_outcome(response)? {
            ResolveOutcome::Unlinked => Ok(None),
            ResolveOutcome::Found(body) => {
                let data: ResolveProjectResponse = decode(&body, "resolve-project response")?;
                Ok(data.project_id)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> ExecutionResult<T> {
    serde_json::from_str(body).map_err(|e| ExecutionError::InvalidResponse {
        message: format!("failed to parse {}: {}", what, e),
    })
}
