use askdb_agents::FlowMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct QueryApiRequest {
    pub question: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub db_path: Option<String>,
    #[serde(default)]
    pub use_default_db: bool,
    /// "tools" or "pipeline"; pipeline when omitted
    #[serde(default)]
    pub mode: Option<FlowMode>,
    /// Model id or display name overriding the configured one
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QueryApiResponse {
    pub sql_query: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
