use schemars::schema::RootSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;

/// A tool that can be called by an LLM
#[derive(Debug, Clone)]
pub struct Tool {
    name: String,
    description: String,
    parameters: RootSchema,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: RootSchema,
    ) -> Self {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Create a tool from a raw JSON Schema object, as advertised by a tool server
    pub fn from_json_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
    ) -> Result<Self, LlmError> {
        let parameters: RootSchema =
            serde_json::from_value(schema).map_err(|e| LlmError::InvalidToolSchema {
                message: e.to_string(),
            })?;

        Ok(Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &RootSchema {
        &self.parameters
    }

    /// Parameters schema as plain JSON
    pub fn parameters_json(&self) -> Value {
        serde_json::to_value(&self.parameters).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// A tool call from the LLM
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    id: String,
    name: String,
    arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get raw JSON arguments
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }
}

/// Tool execution result to send back to the LLM
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    tool_call_id: String,
    content: String,
    is_error: bool,
}

impl ToolResult {
    /// Create a tool result from a plain text string
    pub fn text(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: text.into(),
            is_error: false,
        }
    }

    /// Create a tool result that reports a failure as text
    pub fn error(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(tool_call_id, text)
        }
    }

    pub fn tool_call_id(&self) -> &str {
        &self.tool_call_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

impl From<ToolResult> for crate::types::ContentBlock {
    fn from(result: ToolResult) -> Self {
        crate::types::ContentBlock::ToolResult {
            tool_use_id: result.tool_call_id,
            content: result.content,
            is_error: result.is_error,
        }
    }
}

impl From<&ToolCall> for crate::types::ContentBlock {
    fn from(call: &ToolCall) -> Self {
        crate::types::ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.arguments.clone(),
        }
    }
}

/// Tool choice strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools
    #[default]
    Auto,
    /// Force the model to use at least one tool
    Required,
    /// Disable tool use
    None,
    /// Force a specific tool by name
    Specific { name: String },
}

/// Convert unified Tool to provider-specific format
pub trait ProviderToolFormat {
    type ProviderTool: Serialize;

    fn to_provider_tool(tool: &Tool) -> Self::ProviderTool;
    fn to_provider_tool_choice(choice: &ToolChoice) -> Value;
}
