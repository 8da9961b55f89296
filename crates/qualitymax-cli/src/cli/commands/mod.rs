use qualitymax_client::{ClientConfig, ExecutionClient};

use super::args::ApiArgs;

mod dispatch;
pub mod execution;
pub mod project;
pub mod run;

pub use dispatch::dispatch;

/// Client from the environment, with explicit flags taking precedence.
pub(crate) fn build_client(api: &ApiArgs) -> anyhow::Result<ExecutionClient> {
    let mut config = ClientConfig::from_env();
    if let Some(key) = &api.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(url) = api.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config = config.with_url(url);
    }
    Ok(ExecutionClient::new(config)?)
}
