use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod run;
pub use run::*;


#[derive(Parser)]
#[command(
    name = "qualitymax",
    version,
    about = "Run QualityMax browser tests from CI and report the results"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Trigger a run, wait for it, and publish outputs, summary and PR comment
    Run(RunArgs),
    /// Check that the API key is accepted
    Validate(ValidateArgs),
    /// Show the current state of an execution
    Status(ExecutionArgs),
    /// Fetch the results of a finished execution
    Results(ResultsArgs),
    /// Request cancellation of an execution
    Cancel(ExecutionArgs),
    Version,
}

/// Connection settings shared by every command that talks to the service.
#[derive(Args, Clone, Debug)]
pub struct ApiArgs {
    /// QualityMax API key
    #[arg(long, env = "QUALITYMAX_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "QUALITYMAX_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Parser, Clone, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Parser, Clone, Debug)]
pub struct ExecutionArgs {
    /// Execution id returned by `run` or the trigger endpoint
    pub execution_id: String,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Parser, Clone, Debug)]
pub struct ResultsArgs {
    pub execution_id: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
