//! Run command arguments.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use qualitymax_client::Browser;

use super::ApiArgs;

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub api: ApiArgs,

    /// Project to run; takes precedence over --project-name
    #[arg(long, env = "QUALITYMAX_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Project name (case-insensitive); falls back to the linked repository
    #[arg(long, env = "QUALITYMAX_PROJECT_NAME")]
    pub project_name: Option<String>,

    #[arg(long, env = "QUALITYMAX_TEST_SUITE", default_value = "all")]
    pub test_suite: String,

    /// Comma separated test ids, e.g. "12,15,18"
    #[arg(long, env = "QUALITYMAX_TEST_IDS", value_parser = parse_test_ids)]
    pub test_ids: Option<TestIds>,

    /// Override the base URL under test
    #[arg(long, env = "QUALITYMAX_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "QUALITYMAX_BROWSER", value_enum, default_value_t = BrowserArg::Chromium)]
    pub browser: BrowserArg,

    #[arg(
        long,
        env = "QUALITYMAX_HEADLESS",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub headless: bool,

    /// Wall-clock budget for the whole run; the execution is cancelled when exceeded
    #[arg(
        long,
        env = "QUALITYMAX_TIMEOUT_MINUTES",
        default_value_t = 30,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub timeout_minutes: u32,

    /// Exit non-zero when the run's result is failed
    #[arg(
        long,
        env = "QUALITYMAX_FAIL_ON_TEST_FAILURE",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub fail_on_test_failure: bool,

    /// Post the results as a pull request comment (needs GITHUB_TOKEN)
    #[arg(
        long,
        env = "QUALITYMAX_POST_PR_COMMENT",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub post_pr_comment: bool,

    /// Extra test variable, KEY=VALUE (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserArg {
    Chromium,
    Firefox,
    Webkit,
}

impl From<BrowserArg> for Browser {
    fn from(value: BrowserArg) -> Self {
        match value {
            BrowserArg::Chromium => Browser::Chromium,
            BrowserArg::Firefox => Browser::Firefox,
            BrowserArg::Webkit => Browser::Webkit,
        }
    }
}

/// Parsed `--test-ids` list. A newtype so clap treats the flag as a single value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestIds(pub Vec<u64>);

pub fn parse_test_ids(raw: &str) -> Result<TestIds, String> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| format!("invalid test id '{}': expected an integer", s))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err("expected at least one test id".to_string());
    }
    Ok(TestIds(ids))
}

pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
