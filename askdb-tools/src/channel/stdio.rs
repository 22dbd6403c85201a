use super::protocol::{
    JsonRpcRequest, JsonRpcResponse, METHOD_CALL_TOOL, METHOD_INITIALIZE, METHOD_LIST_TOOLS,
    METHOD_SHUTDOWN,
};
use super::{CallToolResult, ChannelError, SessionConfig, ToolChannel, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Channel to an `askdb-tool-server` child process over stdin/stdout
///
/// The child is killed if the channel is dropped without `close`.
pub struct StdioChannel {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    connected: bool,
}

#[derive(Deserialize)]
struct ListToolsResult {
    tools: Vec<ToolDescriptor>,
}

impl StdioChannel {
    /// Start the server process; the session is not usable until [`Self::initialize`]
    pub fn spawn(program: impl AsRef<OsStr>) -> Result<Self, ChannelError> {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ChannelError::Transport(format!(
                    "failed to start {}: {}",
                    program.to_string_lossy(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChannelError::Transport("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ChannelError::Transport("child stdout unavailable".to_string()))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            connected: false,
        })
    }

    /// Spawn the server and complete the handshake
    pub async fn connect(
        program: impl AsRef<OsStr>,
        config: SessionConfig,
    ) -> Result<Self, ChannelError> {
        let mut channel = Self::spawn(program)?;
        channel.initialize(&config).await?;
        Ok(channel)
    }

    pub async fn initialize(&mut self, config: &SessionConfig) -> Result<(), ChannelError> {
        let params = serde_json::to_value(config)
            .map_err(|e| ChannelError::Protocol(e.to_string()))?;
        self.request(METHOD_INITIALIZE, params).await?;
        self.connected = true;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value, ChannelError> {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_vec(&JsonRpcRequest::new(id, method, params))
            .map_err(|e| ChannelError::Protocol(e.to_string()))?;
        line.push(b'\n');
        self.stdin.write_all(&line).await?;
        self.stdin.flush().await?;

        let reply = self
            .stdout
            .next_line()
            .await?
            .ok_or_else(|| ChannelError::Transport("tool server closed its output".to_string()))?;

        let response: JsonRpcResponse = serde_json::from_str(&reply)
            .map_err(|e| ChannelError::Protocol(format!("malformed response: {}", e)))?;

        if response.id != Value::from(id) {
            return Err(ChannelError::Protocol(format!(
                "response id {} does not match request id {}",
                response.id, id
            )));
        }

        match (response.result, response.error) {
            (_, Some(error)) => Err(error.into_channel_error()),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }

    fn ensure_connected(&self) -> Result<(), ChannelError> {
        if self.connected {
            Ok(())
        } else {
            Err(ChannelError::NotConnected)
        }
    }
}

#[async_trait]
impl ToolChannel for StdioChannel {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ChannelError> {
        self.ensure_connected()?;
        let result = self.request(METHOD_LIST_TOOLS, Value::Null).await?;
        let list: ListToolsResult = serde_json::from_value(result)
            .map_err(|e| ChannelError::Protocol(format!("invalid tools/list result: {}", e)))?;
        Ok(list.tools)
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ChannelError> {
        self.ensure_connected()?;
        let result = self
            .request(METHOD_CALL_TOOL, json!({ "name": name, "arguments": arguments }))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| ChannelError::Protocol(format!("invalid tools/call result: {}", e)))
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;

        let shutdown = self.request(METHOD_SHUTDOWN, Value::Null).await;
        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(status) => {
                tracing::debug!(status = ?status, "Tool server exited");
            }
            Err(_) => {
                tracing::warn!("Tool server did not exit after shutdown, killing it");
                self.child.kill().await?;
            }
        }
        shutdown.map(|_| ())
    }
}
