use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::{
    claude::{
        tools::ClaudeToolFormat,
        types::{
            ClaudeContentBlock, ClaudeErrorResponse, ClaudeMessage, ClaudeMessageRequest,
            ClaudeMessageResponse, ClaudeRole,
        },
    },
    error::LlmError,
    models,
    tools::{ProviderToolFormat, ToolCall},
    types::{CompletionRequest, CompletionResponse, ContentBlock, Message, Role, Usage},
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Claude (Anthropic) LLM client
pub struct ClaudeClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl ClaudeClient {
    /// Create a new Claude client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: models::claude::DEFAULT_ID.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model used when a request leaves `model` empty
    ///
    /// Accepts catalog display names as well as raw model ids.
    pub fn with_model(mut self, model: impl AsRef<str>) -> Self {
        self.model = models::resolve_model(model.as_ref()).to_string();
        self
    }

    /// Create a message using the Claude Messages API
    pub async fn create_message(
        &self,
        request: ClaudeMessageRequest,
    ) -> Result<ClaudeMessageResponse, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| LlmError::authentication("Invalid API key format"))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "Sending Claude request"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            return response
                .json::<ClaudeMessageResponse>()
                .await
                .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)));
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse().ok());

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = match serde_json::from_str::<ClaudeErrorResponse>(&error_text) {
            Ok(error_response) => error_response.error.message,
            Err(_) => error_text,
        };

        tracing::warn!(status = status.as_u16(), %message, "Claude request failed");
        Err(LlmError::from_status(status.as_u16(), message, retry_after))
    }
}

fn to_claude_message(message: Message) -> ClaudeMessage {
    let role = match message.role {
        Role::User => ClaudeRole::User,
        Role::Assistant => ClaudeRole::Assistant,
    };

    let content = message
        .content
        .into_iter()
        .map(|block| match block {
            ContentBlock::Text { text } => ClaudeContentBlock::Text { text },
            ContentBlock::ToolUse { id, name, input } => {
                ClaudeContentBlock::ToolUse { id, name, input }
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => ClaudeContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
        })
        .collect();

    ClaudeMessage { role, content }
}

#[async_trait]
impl crate::client::LlmClient for ClaudeClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            models::resolve_model(&request.model).to_string()
        };

        let claude_request = ClaudeMessageRequest {
            model,
            max_tokens: request.max_tokens,
            messages: request.messages.into_iter().map(to_claude_message).collect(),
            system: request.system,
            temperature: request.temperature,
            tools: request
                .tools
                .map(|tools| tools.iter().map(ClaudeToolFormat::to_provider_tool).collect()),
            tool_choice: request
                .tool_choice
                .as_ref()
                .map(ClaudeToolFormat::to_provider_tool_choice),
        };

        let claude_response = self.create_message(claude_request).await?;

        // Text parts go to `content`, tool_use parts to `tool_calls`, both in order
        let mut content = Vec::new();
        let mut tool_calls = Vec::new();

        for block in claude_response.content {
            match block {
                ClaudeContentBlock::Text { text } => content.push(ContentBlock::Text { text }),
                ClaudeContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall::new(id, name, input))
                }
                ClaudeContentBlock::ToolResult { .. } => {
                    return Err(LlmError::internal(
                        "Unexpected tool_result block in assistant response",
                    ))
                }
            }
        }

        Ok(CompletionResponse {
            content,
            role: match claude_response.role {
                ClaudeRole::User => Role::User,
                ClaudeRole::Assistant => Role::Assistant,
            },
            usage: Usage {
                input_tokens: claude_response.usage.input_tokens,
                output_tokens: claude_response.usage.output_tokens,
            },
            stop_reason: claude_response.stop_reason,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
        })
    }

    fn provider_name(&self) -> &str {
        crate::providers::ANTHROPIC
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
