use super::{CallToolResult, ChannelError, SessionConfig, ToolChannel, ToolDescriptor};
use crate::server::ToolServer;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// In-process channel around a [`ToolServer`]
///
/// SQLite work runs on the blocking pool.
pub struct LocalChannel {
    server: Arc<Mutex<ToolServer>>,
    connected: bool,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self {
            server: Arc::new(Mutex::new(ToolServer::new())),
            connected: false,
        }
    }

    /// Create a channel and complete the handshake
    pub async fn connect(config: SessionConfig) -> Result<Self, ChannelError> {
        let mut channel = Self::new();
        channel.initialize(config).await?;
        Ok(channel)
    }

    pub async fn initialize(&mut self, config: SessionConfig) -> Result<(), ChannelError> {
        self.with_server(move |server| server.initialize(&config))
            .await?;
        self.connected = true;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    async fn with_server<T, F>(&self, f: F) -> Result<T, ChannelError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ToolServer) -> Result<T, ChannelError> + Send + 'static,
    {
        let server = Arc::clone(&self.server);
        tokio::task::spawn_blocking(move || {
            let mut guard = server
                .lock()
                .map_err(|_| ChannelError::Transport("tool server lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| ChannelError::Transport(e.to_string()))?
    }

    fn ensure_connected(&self) -> Result<(), ChannelError> {
        if self.connected {
            Ok(())
        } else {
            Err(ChannelError::NotConnected)
        }
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolChannel for LocalChannel {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ChannelError> {
        self.ensure_connected()?;
        self.with_server(|server| server.list_tools()).await
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ChannelError> {
        self.ensure_connected()?;
        let name = name.to_string();
        self.with_server(move |server| server.call_tool(&name, arguments))
            .await
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;
        self.with_server(|server| {
            server.shutdown();
            Ok(())
        })
        .await
    }
}
