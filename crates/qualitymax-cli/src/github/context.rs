//! Workflow environment as exposed by the GitHub Actions runner.

use std::path::{Path, PathBuf};

use qualitymax_client::CiContext;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Default)]
pub struct GithubEnv {
    pub repository: String,
    pub sha: String,
    pub git_ref: String,
    pub run_id: String,
    pub run_number: Option<u64>,
    pub actor: Option<String>,
    pub event_name: Option<String>,
    pub event_path: Option<PathBuf>,
    pub api_url: String,
    pub token: Option<String>,
    pub output_path: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,
    /// `GITHUB_ACTIONS=true`: workflow commands are understood.
    pub in_actions: bool,
}

impl GithubEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            repository: non_empty("GITHUB_REPOSITORY").unwrap_or_default(),
            sha: non_empty("GITHUB_SHA").unwrap_or_default(),
            git_ref: non_empty("GITHUB_REF").unwrap_or_default(),
            run_id: non_empty("GITHUB_RUN_ID").unwrap_or_default(),
            run_number: non_empty("GITHUB_RUN_NUMBER").and_then(|v| v.trim().parse().ok()),
            actor: non_empty("GITHUB_ACTOR"),
            event_name: non_empty("GITHUB_EVENT_NAME"),
            event_path: non_empty("GITHUB_EVENT_PATH").map(PathBuf::from),
            api_url: non_empty("GITHUB_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            token: non_empty("GITHUB_TOKEN"),
            output_path: non_empty("GITHUB_OUTPUT").map(PathBuf::from),
            summary_path: non_empty("GITHUB_STEP_SUMMARY").map(PathBuf::from),
            in_actions: lookup("GITHUB_ACTIONS").as_deref() == Some("true"),
        }
    }

    /// Context forwarded to the service. The PR number comes from the event payload.
    pub fn ci_context(&self) -> CiContext {
        CiContext {
            repository: self.repository.clone(),
            sha: self.sha.clone(),
            git_ref: self.git_ref.clone(),
            run_id: self.run_id.clone(),
            run_number: self.run_number,
            pr_number: self.event_path.as_deref().and_then(pull_request_number),
            actor: self.actor.clone(),
            event_name: self.event_name.clone(),
        }
    }

    /// `(owner, repo)` from `GITHUB_REPOSITORY`.
    pub fn owner_repo(&self) -> Option<(&str, &str)> {
        let (owner, repo) = self.repository.split_once('/')?;
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some((owner, repo))
    }
}

fn pull_request_number(event_path: &Path) -> Option<u64> {
    let raw = match std::fs::read_to_string(event_path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(path = %event_path.display(), error = %e, "event payload not readable");
            return None;
        }
    };
    let payload: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(path = %event_path.display(), error = %e, "event payload is not JSON");
            return None;
        }
    };
    payload
        .get("pull_request")
        .and_then(|pr| pr.get("number"))
        .and_then(serde_json::Value::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> GithubEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GithubEnv::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn reads_workflow_variables() {
        let env = env_from(&[
            ("GITHUB_REPOSITORY", "acme/shop"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_RUN_ID", "991"),
            ("GITHUB_RUN_NUMBER", "17"),
            ("GITHUB_ACTOR", "octocat"),
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_ACTIONS", "true"),
        ]);

        let ctx = env.ci_context();
        assert_eq!(ctx.repository, "acme/shop");
        assert_eq!(ctx.git_ref, "refs/heads/main");
        assert_eq!(ctx.run_number, Some(17));
        assert_eq!(ctx.actor.as_deref(), Some("octocat"));
        assert_eq!(ctx.pr_number, None);
        assert!(env.in_actions);
        assert_eq!(env.api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(env.owner_repo(), Some(("acme", "shop")));
    }

    #[test]
    fn pr_number_comes_from_event_payload() {
        let mut event = tempfile::NamedTempFile::new().unwrap();
        write!(event, r#"{{"action":"opened","pull_request":{{"number":42}}}}"#).unwrap();
        let path = event.path().to_string_lossy().to_string();

        let env = env_from(&[
            ("GITHUB_REPOSITORY", "acme/shop"),
            ("GITHUB_EVENT_PATH", &path),
        ]);
        assert_eq!(env.ci_context().pr_number, Some(42));
    }

    #[test]
    fn unreadable_event_payload_means_no_pr() {
        let env = env_from(&[("GITHUB_EVENT_PATH", "/nonexistent/event.json")]);
        assert_eq!(env.ci_context().pr_number, None);
    }

    #[test]
    fn empty_values_are_unset() {
        let env = env_from(&[
            ("GITHUB_TOKEN", ""),
            ("GITHUB_OUTPUT", "  "),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
        ]);
        assert!(env.token.is_none());
        assert!(env.output_path.is_none());
        assert_eq!(env.api_url, "https://ghe.example.com/api/v3");
        assert!(!env.in_actions);
        assert_eq!(env.owner_repo(), None);
    }
}
