use crate::config::{ApiConfig, ToolTransport};
use askdb_agents::{ChannelFactory, LocalChannelFactory, StdioChannelFactory};
use askdb_llm_sdk::claude::ClaudeClient;
use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::providers;
use anyhow::{anyhow, bail};
use std::sync::Arc;

/// Builds the model client for one query, optionally overriding the model
pub type ClientFactory =
    Arc<dyn Fn(Option<&str>) -> anyhow::Result<Arc<dyn LlmClient>> + Send + Sync>;

pub fn create_client_factory(config: &ApiConfig) -> ClientFactory {
    let provider = config.llm.provider.to_lowercase();
    let default_model = config.llm.model.clone();
    let api_key = config.anthropic_api_key();

    Arc::new(move |requested_model: Option<&str>| -> anyhow::Result<Arc<dyn LlmClient>> {
        if provider != providers::ANTHROPIC {
            bail!("Proveedor de LLM no soportado: {}", provider);
        }

        let api_key = api_key.clone().ok_or_else(|| {
            anyhow!(
                "Las credenciales de Anthropic son requeridas. \
                 Configura anthropic_api_key en api.toml o la variable ANTHROPIC_API_KEY."
            )
        })?;

        let mut client = ClaudeClient::new(api_key)?;
        let model = requested_model
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .or_else(|| default_model.clone());
        if let Some(model) = model {
            client = client.with_model(model);
        }

        let client: Arc<dyn LlmClient> = Arc::new(client);
        Ok(client)
    })
}

pub fn create_channel_factory(config: &ApiConfig) -> anyhow::Result<Arc<dyn ChannelFactory>> {
    match config.tools.transport {
        ToolTransport::Local => Ok(Arc::new(LocalChannelFactory)),
        ToolTransport::Stdio => {
            let program = config.tools.server_command.clone().ok_or_else(|| {
                anyhow!("tools.server_command is required when tools.transport = \"stdio\"")
            })?;
            Ok(Arc::new(StdioChannelFactory::new(program)))
        }
    }
}
