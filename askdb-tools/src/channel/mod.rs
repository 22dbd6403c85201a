//! Tool Channel: the request/response surface the agent uses to reach tools
//!
//! A channel is parameterized by a [`SessionConfig`] at handshake time and
//! owns that session's database connection until it is closed or dropped.
//! Every operation before the handshake, or after [`ToolChannel::close`],
//! fails with [`ChannelError::NotConnected`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod local;
pub mod protocol;
pub mod stdio;

pub use local::LocalChannel;
pub use stdio::StdioChannel;

/// Parameters of one query session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub db_path: String,
    pub context: String,
}

impl SessionConfig {
    pub fn new(db_path: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            context: context.into(),
        }
    }
}

/// A callable tool as advertised by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the arguments object, when the server declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

/// Text output of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Used before the handshake completed or after the channel was closed
    #[error("Not connected to the tool server")]
    NotConnected,
    #[error("Handshake failed: {0}")]
    Handshake(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("Tool server error: {0}")]
    Server(String),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        ChannelError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait ToolChannel: Send {
    /// Tools of the current session; identical on every call within a session
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ChannelError>;

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ChannelError>;

    /// Release the session; later calls fail with `NotConnected`
    async fn close(&mut self) -> Result<(), ChannelError>;
}
