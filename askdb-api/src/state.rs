use crate::config::ApiConfig;
use crate::helpers::llm::{create_channel_factory, create_client_factory, ClientFactory};
use askdb_agents::{ChannelFactory, LoopConfig};
use std::sync::Arc;

/// Shared, read-only server state; queries never mutate it
#[derive(Clone)]
pub struct AppState {
    pub default_db_path: String,
    pub loop_config: LoopConfig,
    pub clients: ClientFactory,
    pub channels: Arc<dyn ChannelFactory>,
}

impl AppState {
    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            default_db_path: config.default_db_path(),
            loop_config: config.loop_config(),
            clients: create_client_factory(config),
            channels: create_channel_factory(config)?,
        })
    }
}
