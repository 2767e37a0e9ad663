//! Client for any endpoint speaking the OpenAI chat completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{prompt, ChatMessage, PlanGenerator, PlanRequest};
use crate::config::LlmConfig;
use crate::error::{AppError, Result};
use crate::models::TrainingPlan;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct OpenAiPlanGenerator {
    client: Client,
    config: LlmConfig,
}

impl OpenAiPlanGenerator {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initialized plan generator"
        );
        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect());
        AppError::Upstream(format!("LLM API error ({}): {}", status, detail))
    }

    /// Send the messages and return the assistant's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let mut request = self.client.post(self.completions_url()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to reach LLM API: {}", e);
            if e.is_timeout() {
                AppError::Upstream("LLM API timed out".to_string())
            } else {
                AppError::Upstream(format!("Failed to reach LLM API: {}", e))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read LLM response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| AppError::Upstream(format!("Malformed LLM response: {}", e)))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "LLM usage"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Upstream("LLM returned an empty answer".to_string()))
    }
}

#[async_trait]
impl PlanGenerator for OpenAiPlanGenerator {
    #[instrument(skip_all, fields(body_part = %request.body_part.id, model = %self.config.model))]
    async fn generate(&self, request: &PlanRequest) -> Result<TrainingPlan> {
        let messages = prompt::build_messages(request);
        let content = self.complete(&messages).await?;
        prompt::parse_plan(&content, request)
    }
}
