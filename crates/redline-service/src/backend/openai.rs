use std::time::Duration;

use async_trait::async_trait;
use redline_core::writing::WritingResponse;
use redline_prompts::ChatMessage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{BackendError, CompletionBackend};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Whole-request timeout. `None` waits for as long as the provider takes.
    pub timeout: Option<Duration>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }
}

/// Chat-completions client using strict JSON-schema structured output.
pub struct OpenAiBackend {
    endpoint: String,
    /// Pre-computed `"Bearer <key>"` header value.
    auth_header: Option<String>,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    n: u8,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiBackend {
    pub fn new(config: &OpenAiConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder().connect_timeout(Duration::from_secs(10));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Transport(format!("build client: {e}")))?;
        Ok(Self {
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            auth_header: config.api_key.as_ref().map(|k| format!("Bearer {k}")),
            model: config.model.clone(),
            client,
        })
    }

    fn build_request<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages,
            n: 1,
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: WritingResponse::SCHEMA_NAME,
                    strict: true,
                    schema: WritingResponse::json_schema(),
                },
            },
        }
    }
}

/// Pull the structured result out of the first choice.
fn parse_completion(resp: ChatResponse) -> Result<WritingResponse, BackendError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or(BackendError::EmptyCompletion)?;
    if let Some(refusal) = choice.message.refusal {
        return Err(BackendError::Refused(refusal));
    }
    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(BackendError::EmptyCompletion)?;
    serde_json::from_str(&content).map_err(|e| BackendError::Malformed(e.to_string()))
}

/// Best-effort extraction of `{"error": {"message": ...}}` from a provider error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<WritingResponse, BackendError> {
        let body = self.build_request(messages);
        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(ref auth) = self.auth_header {
            builder = builder.header("Authorization", auth);
        }

        debug!("POST {} (model={})", self.endpoint, self.model);
        let resp = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed = resp
            .json::<ChatResponse>()
            .await
            .map_err(|e| BackendError::Malformed(format!("json decode: {e}")))?;
        parse_completion(parsed)
    }
}
