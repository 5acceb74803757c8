//! Azure OpenAI chat-completions client with retry logic.

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::llm::{self, LlmService, TaskKind};
use crate::recipe::Step;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const MAX_TOKENS: usize = 256;
const TEMPERATURE: f32 = 0.7;
const MAX_RETRIES: u32 = 2;
const RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<Message>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Azure OpenAI client; one instance serves both task kinds, routing
/// each to its configured deployment.
pub struct AzureOpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl AzureOpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn request_url(&self, task: TaskKind) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.models.deployment_for(task),
            self.config.api_version
        )
    }

    async fn complete(&self, task: TaskKind, system: &str, user: String) -> Result<String> {
        let request = ChatRequest {
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let mut retry_count = 0;
        loop {
            match self.make_request(task, &request).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    if retry_count >= MAX_RETRIES || !is_retryable(&e) {
                        return Err(tag_for_task(task, e));
                    }
                    retry_count += 1;
                    let delay = calculate_backoff(retry_count);
                    debug!(?task, retry_count, delay_ms = delay, "retrying backend request");
                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    async fn make_request(&self, task: TaskKind, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(self.request_url(task))
            .header("api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Backend(format!("request failed: {e}")))?;

        match response.status() {
            StatusCode::OK => {
                let body: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Backend(format!("failed to parse response: {e}")))?;

                body.choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .filter(|content| !content.trim().is_empty())
                    .ok_or_else(|| Error::Backend("empty completion".to_string()))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                Err(Error::Backend("rate limit exceeded".to_string()))
            }
            StatusCode::UNAUTHORIZED => Err(Error::Config("invalid API key".to_string())),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(Error::Backend(format!("API error {status}: {error_text}")))
            }
        }
    }
}

#[async_trait]
impl LlmService for AzureOpenAiClient {
    async fn complete_suggestion(&self, context: &Step) -> Result<String> {
        self.complete(
            TaskKind::Suggestion,
            llm::SUGGESTION_SYSTEM_PROMPT,
            llm::suggestion_prompt(context),
        )
        .await
    }

    async fn complete_answer(&self, question: &str, context: &Step) -> Result<String> {
        self.complete(
            TaskKind::Answer,
            llm::ANSWER_SYSTEM_PROMPT,
            llm::answer_prompt(question, context),
        )
        .await
    }
}

fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Backend(msg) => {
            msg.contains("rate limit") || msg.contains("timeout") || msg.contains("connection")
        }
        _ => false,
    }
}

fn calculate_backoff(retry_count: u32) -> u64 {
    RETRY_DELAY_MS * 2u64.pow(retry_count - 1)
}

/// Fold transport-level failures into the per-task error kind the
/// session layer reports on.
fn tag_for_task(task: TaskKind, error: Error) -> Error {
    match (task, error) {
        (_, e @ Error::Config(_)) => e,
        (TaskKind::Suggestion, e) => Error::Suggestion(e.to_string()),
        (TaskKind::Answer, e) => Error::Answer(e.to_string()),
    }
}
