//! Backend configuration resolved once at startup.
//!
//! Credentials and deployment names come from the environment; the
//! per-task model mapping is fixed for the lifetime of the session.

use crate::error::{Error, Result};
use crate::llm::TaskKind;
use std::env;
use std::time::Duration;

const DEFAULT_API_VERSION: &str = "2024-02-01";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maps each task kind to the deployment that should serve it.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    suggestion_deployment: String,
    answer_deployment: String,
}

impl ModelConfig {
    pub fn new(suggestion_deployment: String, answer_deployment: String) -> Self {
        Self {
            suggestion_deployment,
            answer_deployment,
        }
    }

    pub fn deployment_for(&self, task: TaskKind) -> &str {
        match task {
            TaskKind::Suggestion => &self.suggestion_deployment,
            TaskKind::Answer => &self.answer_deployment,
        }
    }
}

/// Connection settings for the Azure OpenAI backend.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
    pub models: ModelConfig,
    pub request_timeout: Duration,
}

impl LlmConfig {
    /// Load backend settings from the environment.
    ///
    /// `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_ENDPOINT` and
    /// `AZURE_OPENAI_DEPLOYMENT_NAME` are required. The per-task
    /// deployment overrides and the API version are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = require_env("AZURE_OPENAI_API_KEY")?;
        let endpoint = require_env("AZURE_OPENAI_ENDPOINT")?;
        let default_deployment = require_env("AZURE_OPENAI_DEPLOYMENT_NAME")?;

        let api_version = env::var("AZURE_OPENAI_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
        let suggestion_deployment = env::var("AZURE_OPENAI_SUGGESTION_DEPLOYMENT")
            .unwrap_or_else(|_| default_deployment.clone());
        let answer_deployment =
            env::var("AZURE_OPENAI_ANSWER_DEPLOYMENT").unwrap_or(default_deployment);

        Ok(Self {
            api_key,
            endpoint,
            api_version,
            models: ModelConfig::new(suggestion_deployment, answer_deployment),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("missing environment variable {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_config_routes_by_task_kind() {
        let models = ModelConfig::new("tips".to_string(), "qa".to_string());
        assert_eq!(models.deployment_for(TaskKind::Suggestion), "tips");
        assert_eq!(models.deployment_for(TaskKind::Answer), "qa");
    }
}
