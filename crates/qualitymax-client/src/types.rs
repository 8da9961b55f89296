//! Wire types for the test-execution API.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque execution identifier returned by trigger.
///
/// The only key needed for status, results and cancel calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExecutionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ExecutionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Server-tracked lifecycle stage of an execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    Timeout,
}

impl RunState {
    /// Terminal states: no further progress, results are fetchable.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Timeout
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed execution or a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,
    Error,
}

impl TestOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser engine the run should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CI context forwarded with the request and echoed back in results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiContext {
    /// `owner/repo`.
    pub repository: String,

    /// Commit SHA.
    pub sha: String,

    /// Git ref (e.g., "refs/heads/main").
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Workflow run id.
    pub run_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_number: Option<u64>,

    /// Pull request number when the run was triggered by a PR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
}

/// Body of POST /github-action/trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub project_id: String,

    /// Named suite ("all", "smoke", "regression", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_suite: Option<String>,

    /// Explicit test selection; takes precedence over the suite server-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_ids: Option<Vec<u64>>,

    /// Target application URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,

    pub github_context: CiContext,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
}

impl ExecutionRequest {
    pub fn new(project_id: impl Into<String>, github_context: CiContext) -> Self {
        Self {
            project_id: project_id.into(),
            github_context,
            ..Default::default()
        }
    }
}

/// Response from POST /github-action/trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub success: bool,

    /// Empty when the service refused the run.
    #[serde(default)]
    pub execution_id: ExecutionId,

    #[serde(default)]
    pub status: RunState,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub estimated_duration_seconds: Option<f64>,

    #[serde(default)]
    pub status_url: String,

    #[serde(default)]
    pub cancel_url: String,
}

impl TriggerResponse {
    pub fn estimated_duration(&self) -> Option<Duration> {
        self.estimated_duration_seconds
            .filter(|s| *s > 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }
}

/// Snapshot from GET /github-action/status/{id}.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    #[serde(default)]
    pub execution_id: ExecutionId,

    pub status: RunState,

    /// Percentage in 0..=100.
    #[serde(default)]
    pub progress: Option<f64>,

    #[serde(default)]
    pub total_tests: Option<u32>,

    #[serde(default)]
    pub completed_tests: Option<u32>,

    #[serde(default)]
    pub passed_tests: Option<u32>,

    #[serde(default)]
    pub failed_tests: Option<u32>,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub estimated_completion: Option<DateTime<Utc>>,

    /// Name of the test currently running.
    #[serde(default)]
    pub current_test: Option<String>,
}

/// One test inside a completed execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub test_id: u64,
    pub test_name: String,
    pub status: TestOutcome,

    #[serde(default)]
    pub duration_seconds: f64,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub screenshot_url: Option<String>,

    #[serde(default)]
    pub video_url: Option<String>,

    #[serde(default)]
    pub retry_count: u32,
}

/// Terminal record from GET /github-action/results/{id}.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResults {
    pub execution_id: ExecutionId,
    pub status: RunState,

    /// Aggregate outcome.
    pub result: TestOutcome,

    #[serde(default)]
    pub total_tests: u32,

    #[serde(default)]
    pub passed_tests: u32,

    #[serde(default)]
    pub failed_tests: u32,

    #[serde(default)]
    pub skipped_tests: u32,

    #[serde(default)]
    pub duration_seconds: f64,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub browser: String,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub report_url: String,

    #[serde(default)]
    pub tests: Vec<TestCaseResult>,

    #[serde(default)]
    pub github_context: Option<CiContext>,

    /// Pre-rendered summary (requested with `include_markdown=true`).
    #[serde(default)]
    pub summary_markdown: Option<String>,
}

impl ExecutionResults {
    pub fn passed(&self) -> bool {
        self.result == TestOutcome::Passed
    }

    /// Tests whose own status is failed.
    pub fn failed_cases(&self) -> impl Iterator<Item = &TestCaseResult> {
        self.tests
            .iter()
            .filter(|t| t.status == TestOutcome::Failed)
    }
}

/// A project visible to the API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Numeric ids are normalised to strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// Response from GET /github-action/projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Response from GET /github-action/resolve-project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveProjectResponse {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub project_id: Option<String>,
}

/// Response from GET /github-action/validate.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ValidateResponse {
    #[serde(default)]
    pub valid: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?
        .map(String::from)
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> CiContext {
        CiContext {
            repository: "owner/repo".into(),
            sha: "abc123".into(),
            git_ref: "refs/heads/main".into(),
            run_id: "123".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let request = ExecutionRequest::new("proj_abc123", context());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["project_id"], "proj_abc123");
        assert_eq!(value["github_context"]["ref"], "refs/heads/main");
        assert!(value.get("test_ids").is_none());
        assert!(value.get("browser").is_none());
        assert!(value["github_context"].get("pr_number").is_none());
    }

    #[test]
    fn test_request_with_selection() {
        let request = ExecutionRequest {
            test_suite: Some("smoke".into()),
            test_ids: Some(vec![1, 2, 3]),
            browser: Some(Browser::Webkit),
            headless: Some(false),
            timeout_minutes: Some(30),
            ..ExecutionRequest::new("proj_abc123", context())
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["test_ids"], json!([1, 2, 3]));
        assert_eq!(value["browser"], "webkit");
        assert_eq!(value["headless"], false);
        assert_eq!(value["timeout_minutes"], 30);
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Cancelled.is_terminal());
        assert!(RunState::Timeout.is_terminal());

        assert!(!RunState::Queued.is_terminal());
        assert!(!RunState::Running.is_terminal());
    }

    #[test]
    fn test_rejected_trigger_response_parses_without_id() {
        let response: TriggerResponse =
            serde_json::from_value(json!({"success": false, "message": "quota exceeded"}))
                .unwrap();
        assert!(!response.success);
        assert!(response.execution_id.is_empty());
        assert_eq!(response.message, "quota exceeded");
    }

    #[test]
    fn test_estimated_duration() {
        let response = TriggerResponse {
            estimated_duration_seconds: Some(90.0),
            ..Default::default()
        };
        assert_eq!(response.estimated_duration(), Some(Duration::from_secs(90)));

        let response = TriggerResponse {
            estimated_duration_seconds: Some(0.0),
            ..Default::default()
        };
        assert_eq!(response.estimated_duration(), None);
    }

    #[test]
    fn test_estimated_duration_out_of_range_is_ignored() {
        let response: TriggerResponse = serde_json::from_value(json!({
            "success": true,
            "execution_id": "ex_1",
            "estimated_duration_seconds": 1e20
        }))
        .unwrap();
        assert_eq!(response.estimated_duration(), None);

        for bad in [f64::INFINITY, f64::NAN, -5.0] {
            let response = TriggerResponse {
                estimated_duration_seconds: Some(bad),
                ..Default::default()
            };
            assert_eq!(response.estimated_duration(), None);
        }
    }

    #[test]
    fn test_status_with_minimal_body() {
        let status: ExecutionStatus =
            serde_json::from_value(json!({"status": "running", "progress": 40})).unwrap();
        assert_eq!(status.status, RunState::Running);
        assert_eq!(status.progress, Some(40.0));
        assert!(status.current_test.is_none());
    }

    #[test]
    fn test_project_id_accepts_numbers() {
        let projects: ProjectsResponse = serde_json::from_value(json!({
            "projects": [{"id": 42, "name": "Web"}, {"id": "proj_7", "name": "Mobile"}]
        }))
        .unwrap();
        assert_eq!(projects.projects[0].id, "42");
        assert_eq!(projects.projects[1].id, "proj_7");

        let resolved: ResolveProjectResponse =
            serde_json::from_value(json!({"project_id": 9})).unwrap();
        assert_eq!(resolved.project_id.as_deref(), Some("9"));

        let resolved: ResolveProjectResponse =
            serde_json::from_value(json!({"project_id": null})).unwrap();
        assert!(resolved.project_id.is_none());
    }

    #[test]
    fn test_failed_cases() {
        let results: ExecutionResults = serde_json::from_value(json!({
            "execution_id": "ex_1",
            "status": "completed",
            "result": "failed",
            "tests": [
                {"test_id": 1, "test_name": "login", "status": "passed", "duration_seconds": 1.5},
                {"test_id": 2, "test_name": "checkout", "status": "failed",
                 "duration_seconds": 3.0, "error_message": "timeout"}
            ]
        }))
        .unwrap();

        let failed: Vec<_> = results.failed_cases().map(|t| t.test_name.as_str()).collect();
        assert_eq!(failed, vec!["checkout"]);
        assert!(!results.passed());
        assert_eq!(results.tests[0].retry_count, 0);
    }
}
