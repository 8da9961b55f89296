//! Pull request comments through the GitHub REST API.

use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Serialize;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone)]
pub struct CommentTarget<'a> {
    pub api_url: &'a str,
    pub owner: &'a str,
    pub repo: &'a str,
    pub pr_number: u64,
}

impl CommentTarget<'_> {
    fn url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.pr_number
        )
    }
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

pub async fn post_pr_comment(
    target: &CommentTarget<'_>,
    token: &str,
    body: &str,
) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to create HTTP client")?;

    let response = client
        .post(target.url())
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .header(ACCEPT, GITHUB_ACCEPT)
        .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
        .header(USER_AGENT, concat!("qualitymax-cli/", env!("CARGO_PKG_VERSION")))
        .json(&CommentBody { body })
        .send()
        .await
        .context("request to GitHub failed")?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("GitHub returned HTTP {}: {}", status.as_u16(), text.trim());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_comment_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/issues/42/comments"))
            .and(header("authorization", "Bearer ghs_token"))
            .and(header("accept", GITHUB_ACCEPT))
            .and(body_json(serde_json::json!({"body": "## Results"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let api_url = server.uri();
        let target = CommentTarget {
            api_url: &api_url,
            owner: "acme",
            repo: "shop",
            pr_number: 42,
        };
        post_pr_comment(&target, "ghs_token", "## Results")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_comment_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string("Resource not accessible by integration"),
            )
            .mount(&server)
            .await;

        let api_url = server.uri();
        let target = CommentTarget {
            api_url: &api_url,
            owner: "acme",
            repo: "shop",
            pr_number: 7,
        };
        let err = post_pr_comment(&target, "t", "x").await.unwrap_err();
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("not accessible"));
    }
}
