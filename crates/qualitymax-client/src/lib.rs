//! Execution lifecycle client for the QualityMax test-execution API.
//!
//! This crate drives remote browser test runs from CI:
//!
//! - Validate the API key (fail-closed)
//! - Trigger a run and keep its execution id
//! - Poll status at a fixed interval until a terminal state
//! - Fetch results once, or cancel when the wall-clock budget runs out
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use qualitymax_client::{CiContext, ClientConfig, ExecutionClient, ExecutionRequest};
//!
//! # async fn example() -> Result<(), qualitymax_client::ExecutionError> {
//! let client = ExecutionClient::new(ClientConfig::from_env().with_api_key("qm_..."))?;
//!
//! let request = ExecutionRequest::new("proj_abc123", CiContext::default());
//! let started = client.trigger(&request).await?;
//! let results = client
//!     .wait_for_completion(&started.execution_id, Duration::from_secs(30 * 60))
//!     .await?;
//! println!("{}: {}/{} passed", results.result, results.passed_tests, results.total_tests);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `QUALITYMAX_API_URL` | API base URL (default: `https://app.qualitymax.ai/api`) |
//! | `QUALITYMAX_API_KEY` | API key |
//! | `QUALITYMAX_REQUEST_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `QUALITYMAX_POLL_INTERVAL_MS` | Status poll interval in milliseconds (default: 5000) |

pub mod client;
pub mod config;
pub mod error;
pub mod progress;
pub mod types;

// Re-export main types
pub use client::{ExecutionClient, CLIENT_USER_AGENT};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_POLL_INTERVAL};
pub use error::{ExecutionError, ExecutionResult};
pub use progress::{format_progress_line, log_progress_sink, ProgressEvent, ProgressSink};
pub use types::{
    Browser, CiContext, ExecutionId, ExecutionRequest, ExecutionResults, ExecutionStatus, Project,
    ProjectsResponse, ResolveProjectResponse, RunState, TestCaseResult, TestOutcome,
    TriggerResponse,
};
