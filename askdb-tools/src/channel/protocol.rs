//! Newline-delimited JSON-RPC 2.0 used between [`super::StdioChannel`] and
//! the `askdb-tool-server` process
//!
//! Methods: `initialize` (params: `SessionConfig`), `tools/list`,
//! `tools/call` (params: `{name, arguments}`), `shutdown`.

use super::{ChannelError, SessionConfig};
use crate::server::ToolServer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const JSONRPC_VERSION: &str = "2.0";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_LIST_TOOLS: &str = "tools/list";
pub const METHOD_CALL_TOOL: &str = "tools/call";
pub const METHOD_SHUTDOWN: &str = "shutdown";

const KNOWN_METHODS: [&str; 4] = [
    METHOD_INITIALIZE,
    METHOD_LIST_TOOLS,
    METHOD_CALL_TOOL,
    METHOD_SHUTDOWN,
];

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const UNKNOWN_TOOL: i64 = -32001;
pub const NOT_INITIALIZED: i64 = -32002;
pub const HANDSHAKE_FAILED: i64 = -32003;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Value::from(id),
            method: method.to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&ChannelError> for JsonRpcError {
    fn from(err: &ChannelError) -> Self {
        let (code, data) = match err {
            ChannelError::NotConnected => (NOT_INITIALIZED, None),
            ChannelError::Handshake(_) => (HANDSHAKE_FAILED, None),
            ChannelError::UnknownTool(name) => (UNKNOWN_TOOL, Some(json!({ "tool": name }))),
            ChannelError::InvalidArguments { tool, message } => (
                INVALID_PARAMS,
                Some(json!({ "tool": tool, "reason": message })),
            ),
            ChannelError::Protocol(_) => (INVALID_PARAMS, None),
            ChannelError::Transport(_) | ChannelError::Server(_) => (INTERNAL_ERROR, None),
        };

        // Handshake and server messages travel bare; the client re-wraps them
        let message = match err {
            ChannelError::Handshake(message) | ChannelError::Server(message) => message.clone(),
            other => other.to_string(),
        };

        Self {
            code,
            message,
            data,
        }
    }
}

impl JsonRpcError {
    /// Rebuild the typed error on the client side
    pub fn into_channel_error(self) -> ChannelError {
        let field = |name: &str| {
            self.data
                .as_ref()
                .and_then(|d| d.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        match self.code {
            NOT_INITIALIZED => ChannelError::NotConnected,
            HANDSHAKE_FAILED => ChannelError::Handshake(self.message.clone()),
            UNKNOWN_TOOL => ChannelError::UnknownTool(field("tool").unwrap_or_default()),
            INVALID_PARAMS => match field("tool") {
                Some(tool) => ChannelError::InvalidArguments {
                    tool,
                    message: field("reason").unwrap_or_else(|| self.message.clone()),
                },
                None => ChannelError::Protocol(self.message.clone()),
            },
            METHOD_NOT_FOUND | PARSE_ERROR => ChannelError::Protocol(self.message.clone()),
            _ => ChannelError::Server(self.message.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Serve one client until `shutdown` or end of input
pub async fn serve<R, W>(mut server: ToolServer, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let (response, stop) = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => {
                let stop = request.method == METHOD_SHUTDOWN;
                (handle_request(&mut server, request), stop)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request line");
                let error = JsonRpcError {
                    code: PARSE_ERROR,
                    message: e.to_string(),
                    data: None,
                };
                (JsonRpcResponse::failure(Value::Null, error), false)
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;

        if stop {
            break;
        }
    }

    server.shutdown();
    Ok(())
}

/// Dispatch one request against the server state
pub fn handle_request(server: &mut ToolServer, request: JsonRpcRequest) -> JsonRpcResponse {
    tracing::debug!(method = %request.method, "Handling request");
    let id = request.id.clone();

    if !KNOWN_METHODS.contains(&request.method.as_str()) {
        let error = JsonRpcError {
            code: METHOD_NOT_FOUND,
            message: format!("method not found: {}", request.method),
            data: None,
        };
        return JsonRpcResponse::failure(id, error);
    }

    match dispatch(server, request) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(err) => JsonRpcResponse::failure(id, JsonRpcError::from(&err)),
    }
}

fn dispatch(server: &mut ToolServer, request: JsonRpcRequest) -> Result<Value, ChannelError> {
    match request.method.as_str() {
        METHOD_INITIALIZE => {
            let config: SessionConfig = serde_json::from_value(request.params)
                .map_err(|e| ChannelError::Protocol(format!("invalid session config: {}", e)))?;
            server.initialize(&config)?;
            Ok(json!({
                "serverInfo": {
                    "name": "askdb-tool-server",
                    "version": env!("CARGO_PKG_VERSION"),
                }
            }))
        }
        METHOD_LIST_TOOLS => {
            let tools = server.list_tools()?;
            Ok(json!({ "tools": tools }))
        }
        METHOD_CALL_TOOL => {
            // Session check comes first so an uninitialized server never parses tool calls
            if !server.is_initialized() {
                return Err(ChannelError::NotConnected);
            }
            let params: CallToolParams = serde_json::from_value(request.params)
                .map_err(|e| ChannelError::Protocol(format!("invalid tools/call params: {}", e)))?;
            let result = server.call_tool(&params.name, params.arguments)?;
            serde_json::to_value(result).map_err(|e| ChannelError::Server(e.to_string()))
        }
        METHOD_SHUTDOWN => {
            server.shutdown();
            Ok(Value::Null)
        }
        other => Err(ChannelError::Protocol(format!("method not found: {}", other))),
    }
}
