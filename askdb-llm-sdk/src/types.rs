use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message (also carries tool results back to the model)
    User,
    /// Assistant message
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Content part of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content
    Text { text: String },
    /// A tool invocation requested by the assistant
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    /// The result of a tool invocation, matched to its request by `tool_use_id`
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns the text of a `Text` block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a new text message
    pub fn text<S: Into<String>>(role: Role, text: S) -> Self {
        Self {
            role,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Create a user message with text content
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::text(Role::User, text)
    }

    /// Create an assistant message with text content
    pub fn assistant<S: Into<String>>(text: S) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// Ids of every tool invocation requested in this message, in order
    pub fn tool_use_ids(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Ids answered by the tool results in this message, in order
    pub fn tool_result_ids(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the input prompt
    pub input_tokens: u32,
    /// Number of tokens in the output completion
    pub output_tokens: u32,
}

/// Generic completion request (provider-agnostic)
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Messages for the conversation
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Model to use (provider-specific)
    pub model: String,
    /// Optional system message
    pub system: Option<String>,
    /// Temperature for randomness (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Tools available to the LLM
    pub tools: Option<Vec<crate::tools::Tool>>,
    /// Tool choice strategy
    pub tool_choice: Option<crate::tools::ToolChoice>,
}

impl CompletionRequest {
    /// Single-turn request with one user message and no tools
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            max_tokens,
            model: model.into(),
            system: None,
            temperature: None,
            tools: None,
            tool_choice: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Generic completion response (provider-agnostic)
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text content, in the order the provider returned it
    pub content: Vec<ContentBlock>,
    /// Role of the response
    pub role: Role,
    /// Token usage information
    pub usage: Usage,
    /// Stop reason
    pub stop_reason: Option<String>,
    /// Tool calls requested by the LLM
    pub tool_calls: Option<Vec<crate::tools::ToolCall>>,
}

impl CompletionResponse {
    /// Plain text answer with no tool calls
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            role: Role::Assistant,
            usage: Usage::default(),
            stop_reason: Some("end_turn".to_string()),
            tool_calls: None,
        }
    }

    /// Text parts of the response, in order
    pub fn text_parts(&self) -> Vec<&str> {
        self.content.iter().filter_map(ContentBlock::as_text).collect()
    }

    /// Concatenation of every text part
    pub fn joined_text(&self) -> String {
        self.text_parts().concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_block_serialization_is_tagged() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: "42".to_string(),
            is_error: false,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_message_tool_ids() {
        let assistant = Message {
            role: Role::Assistant,
            content: vec![
                ContentBlock::text("Voy a consultar"),
                ContentBlock::ToolUse {
                    id: "a".to_string(),
                    name: "execute_sql".to_string(),
                    input: json!({"query": "SELECT 1"}),
                },
                ContentBlock::ToolUse {
                    id: "b".to_string(),
                    name: "get_context".to_string(),
                    input: json!({}),
                },
            ],
        };
        assert_eq!(assistant.tool_use_ids(), vec!["a", "b"]);
        assert!(assistant.tool_result_ids().is_empty());
    }

    #[test]
    fn test_joined_text_keeps_order_without_separator() {
        let response = CompletionResponse {
            content: vec![ContentBlock::text("Hay "), ContentBlock::text("5 ventas")],
            ..CompletionResponse::text("")
        };
        assert_eq!(response.joined_text(), "Hay 5 ventas");
    }
}
