//! HTTP layer: transport, status mapping, cancel/validate outcomes.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{ExecutionError, ExecutionResult};
use crate::types::ExecutionId;

/// Raw response: status plus fully-read body.
#[derive(Debug)]
pub(crate) struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Which call a response belongs to; selects the error mapping.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Call<'a> {
    Trigger,
    Status(&'a ExecutionId),
    Results(&'a ExecutionId),
    Projects,
    ResolveProject,
}

/// Outcome of a resolve-project lookup (404 means nothing is linked).
#[derive(Debug)]
pub(crate) enum ResolveOutcome {
    Unlinked,
    Found(String),
}

/// Outcome of a cancel request.
#[derive(Debug)]
pub(crate) enum CancelOutcome {
    Cancelled,
    Rejected(String),
}

/// HTTP backend (holds the configured reqwest client and base URL).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
}

impl HttpBackend {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Single GET; no retries.
    pub(crate) async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ExecutionResult<ApiResponse> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let request = self.client.get(&url).query(query);
        Self::read(request.send().await?).await
    }

    /// Single POST with a JSON body (or an empty body for `None`); no retries.
    pub(crate) async fn post<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> ExecutionResult<ApiResponse> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let request = match body {
            Some(body) => self.client.post(&url).json(body),
            None => self.client.post(&url).body(""),
        };
        Self::read(request.send().await?).await
    }

    async fn read(response: reqwest::Response) -> ExecutionResult<ApiResponse> {
        let status = response.status();
        let body = response.text().await.map_err(|e| ExecutionError::Network {
            message: format!("failed to read response body: {}", e),
        })?;
        Ok(ApiResponse { status, body })
    }
}

/// Map a response to its body, or to the call's typed error.
pub(crate) fn expect_success(call: Call<'_>, response: ApiResponse) -> ExecutionResult<String> {
    let ApiResponse { status, body } = response;

    if status == StatusCode::NOT_FOUND {
        match call {
            Call::Status(id) => {
                return Err(ExecutionError::NotFound {
                    execution_id: id.to_string(),
                    detail: "not found",
                })
            }
            Call::Results(id) => {
                return Err(ExecutionError::NotFound {
                    execution_id: id.to_string(),
                    detail: "not found or not completed",
                })
            }
            Call::Trigger | Call::Projects | Call::ResolveProject => {}
        }
    }

    if status.as_u16() >= 400 {
        let message = error_message(status, body);
        return Err(match call {
            Call::Trigger => ExecutionError::Trigger { message },
            Call::Status(_) => ExecutionError::Status { message },
            Call::Results(_) => ExecutionError::Results { message },
            Call::Projects | Call::ResolveProject => ExecutionError::Project { message },
        });
    }

    Ok(body)
}

/// Resolve-project mapping: 404 is a normal "nothing linked" answer.
pub(crate) fn resolve_outcome(response: ApiResponse) -> ExecutionResult<ResolveOutcome> {
    if response.status == StatusCode::NOT_FOUND {
        return Ok(ResolveOutcome::Unlinked);
    }
    expect_success(Call::ResolveProject, response).map(ResolveOutcome::Found)
}

/// Cancel mapping: any status >= 400 is a rejection, never an error.
pub(crate) fn cancel_outcome(response: ApiResponse) -> CancelOutcome {
    if response.status.as_u16() >= 400 {
        CancelOutcome::Rejected(error_message(response.status, response.body))
    } else {
        CancelOutcome::Cancelled
    }
}

fn error_message(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(code: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(code).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_passes_body_through() {
        let body = expect_success(Call::Trigger, response(201, "{}")).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn test_404_maps_to_not_found_for_execution_calls() {
        let id = ExecutionId::new("ex_9");
        let err = expect_success(Call::Status(&id), response(404, "")).unwrap_err();
        assert!(matches!(err, ExecutionError::NotFound { detail: "not found", .. }));

        let err = expect_success(Call::Results(&id), response(404, "")).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::NotFound {
                detail: "not found or not completed",
                ..
            }
        ));
    }

    #[test]
    fn test_404_on_trigger_is_trigger_error() {
        let err = expect_success(Call::Trigger, response(404, "no such project")).unwrap_err();
        match err {
            ExecutionError::Trigger { message } => assert_eq!(message, "no such project"),
            other => panic!("expected Trigger error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_without_body_reports_code() {
        let id = ExecutionId::new("ex_9");
        let err = expect_success(Call::Status(&id), response(503, "  ")).unwrap_err();
        assert_eq!(err.to_string(), "failed to get status: HTTP 503");
    }

    #[test]
    fn test_cancel_outcome() {
        assert!(matches!(
            cancel_outcome(response(200, "")),
            CancelOutcome::Cancelled
        ));
        match cancel_outcome(response(409, "already finished")) {
            CancelOutcome::Rejected(message) => assert_eq!(message, "already finished"),
            CancelOutcome::Cancelled => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_resolve_outcome() {
        assert!(matches!(
            resolve_outcome(response(404, "")).unwrap(),
            ResolveOutcome::Unlinked
        ));
        assert!(matches!(
            resolve_outcome(response(200, "{}")).unwrap(),
            ResolveOutcome::Found(_)
        ));
        assert!(resolve_outcome(response(500, "boom")).is_err());
    }
}
