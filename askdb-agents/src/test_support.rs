//! Scripted stand-ins for the model and the Tool Channel

use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::error::LlmError;
use askdb_llm_sdk::tools::ToolCall;
use askdb_llm_sdk::types::{CompletionRequest, CompletionResponse, ContentBlock, Role, Usage};
use askdb_tools::{CallToolResult, ChannelError, ToolChannel, ToolDescriptor};
use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub struct MockLlmClient {
    pub responses: Arc<Mutex<VecDeque<Result<CompletionResponse, LlmError>>>>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmClient {
    pub fn with_responses(responses: Vec<CompletionResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<CompletionResponse, LlmError>>) -> Self {
        MockLlmClient {
            responses: Arc::new(Mutex::new(results.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::internal("mock has no scripted response left")))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse::text(text)
}

pub fn tool_call_response(text: Option<&str>, calls: Vec<ToolCall>) -> CompletionResponse {
    CompletionResponse {
        content: text.map(ContentBlock::text).into_iter().collect(),
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("tool_use".to_string()),
        tool_calls: Some(calls),
    }
}

/// Channel that answers every call from a fixed function and records calls
pub struct MockChannel {
    pub tools: Vec<ToolDescriptor>,
    pub calls: Arc<Mutex<Vec<(String, Value)>>>,
    pub closed: Arc<Mutex<bool>>,
    handler: fn(&str, &Value) -> Result<CallToolResult, ChannelError>,
}

impl MockChannel {
    pub fn new(handler: fn(&str, &Value) -> Result<CallToolResult, ChannelError>) -> Self {
        Self {
            tools: vec![
                ToolDescriptor {
                    name: "execute_sql".to_string(),
                    description: Some("Ejecuta SQL".to_string()),
                    input_schema: None,
                },
                ToolDescriptor {
                    name: "get_context".to_string(),
                    description: None,
                    input_schema: None,
                },
            ],
            calls: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
            handler,
        }
    }

    pub fn echo() -> Self {
        Self::new(|name, args| Ok(CallToolResult::text(format!("{name}:{args}"))))
    }
}

#[async_trait]
impl ToolChannel for MockChannel {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ChannelError> {
        if *self.closed.lock().unwrap() {
            return Err(ChannelError::NotConnected);
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ChannelError> {
        if *self.closed.lock().unwrap() {
            return Err(ChannelError::NotConnected);
        }
        let result = (self.handler)(name, &arguments);
        self.calls.lock().unwrap().push((name.to_string(), arguments));
        result
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

/// Temporary SQLite database with a small `ventas` table
pub fn setup_sales_db() -> anyhow::Result<(NamedTempFile, String)> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Failed to convert path to string"))?
        .to_string();

    let conn = Connection::open(&db_path)?;
    conn.execute(
        "CREATE TABLE ventas (
            id INTEGER PRIMARY KEY,
            producto TEXT NOT NULL,
            pais TEXT NOT NULL,
            monto REAL NOT NULL
        )",
        [],
    )?;

    let rows = [
        ("Laptop", "Chile", 1200.0),
        ("Mouse", "Peru", 25.5),
        ("Monitor", "Chile", 310.0),
    ];
    for (producto, pais, monto) in rows {
        conn.execute(
            "INSERT INTO ventas (producto, pais, monto) VALUES (?1, ?2, ?3)",
            rusqlite::params![producto, pais, monto],
        )?;
    }

    Ok((temp_file, db_path))
}
