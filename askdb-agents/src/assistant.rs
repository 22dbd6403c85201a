use crate::pipeline::{SqlPipeline, SqliteEngine};
use crate::tool_loop::ToolCallingAgent;
use crate::types::{FlowMode, LoopConfig, QueryRequest, QueryResponse};
use askdb_llm_sdk::client::LlmClient;
use askdb_tools::{ChannelError, LocalChannel, SessionConfig, StdioChannel, ToolChannel};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub const EMPTY_QUESTION_MESSAGE: &str = "Por favor ingresa una pregunta.";

/// Opens one connected Tool Channel session per question
#[async_trait]
pub trait ChannelFactory: Send + Sync {
    async fn open(&self, config: SessionConfig) -> Result<Box<dyn ToolChannel>, ChannelError>;
}

/// Runs the tool server inside this process
#[derive(Debug, Default, Clone)]
pub struct LocalChannelFactory;

#[async_trait]
impl ChannelFactory for LocalChannelFactory {
    async fn open(&self, config: SessionConfig) -> Result<Box<dyn ToolChannel>, ChannelError> {
        let channel = LocalChannel::connect(config).await?;
        Ok(Box::new(channel))
    }
}

/// Spawns `askdb-tool-server` as a child process per question
#[derive(Debug, Clone)]
pub struct StdioChannelFactory {
    program: PathBuf,
}

impl StdioChannelFactory {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ChannelFactory for StdioChannelFactory {
    async fn open(&self, config: SessionConfig) -> Result<Box<dyn ToolChannel>, ChannelError> {
        let channel = StdioChannel::connect(&self.program, config).await?;
        Ok(Box::new(channel))
    }
}

/// Entry point that answers a question with the requested flow.
///
/// Holds no per-question state; every call opens and releases its own
/// database connection or tool session.
pub struct Assistant {
    client: Arc<dyn LlmClient>,
    channels: Arc<dyn ChannelFactory>,
    config: LoopConfig,
}

impl Assistant {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            channels: Arc::new(LocalChannelFactory),
            config: LoopConfig::default(),
        }
    }

    pub fn with_channel_factory(mut self, channels: Arc<dyn ChannelFactory>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn ask(&self, request: QueryRequest) -> QueryResponse {
        if request.question.trim().is_empty() {
            return QueryResponse::answer(EMPTY_QUESTION_MESSAGE);
        }

        tracing::info!(
            mode = ?request.mode,
            db_path = %request.db_path,
            model = self.client.model_name(),
            "Answering question"
        );

        match request.mode {
            FlowMode::ToolCalling => self.ask_with_tools(&request).await,
            FlowMode::Pipeline => self.ask_with_pipeline(&request).await,
        }
    }

    async fn ask_with_tools(&self, request: &QueryRequest) -> QueryResponse {
        let session = SessionConfig::new(&request.db_path, &request.context);
        let mut channel = match self.channels.open(session).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::error!(error = %e, "Could not open tool channel");
                return QueryResponse::answer(format!(
                    "Error conectando al servidor de herramientas: {}",
                    e
                ));
            }
        };

        let outcome = ToolCallingAgent::new(self.client.clone())
            .with_config(self.config)
            .run(&request.question, channel.as_mut())
            .await;

        if let Err(e) = channel.close().await {
            tracing::warn!(error = %e, "Tool channel did not close cleanly");
        }

        match outcome {
            Ok(report) => QueryResponse::answer(report.outcome.into_response_text()),
            Err(e) => QueryResponse::answer(format!(
                "Error conectando al servidor de herramientas: {}",
                e
            )),
        }
    }

    async fn ask_with_pipeline(&self, request: &QueryRequest) -> QueryResponse {
        let mut engine = match SqliteEngine::open(&request.db_path) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(error = %e, "Could not open database");
                return QueryResponse::answer(format!("Error abriendo la base de datos: {}", e));
            }
        };

        SqlPipeline::new(self.client.clone())
            .with_limits(self.config.limits)
            .run(&request.question, &request.context, &mut engine)
            .await
    }
}
