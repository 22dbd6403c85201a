use crate::{
    error::LlmError,
    types::{CompletionRequest, CompletionResponse},
};
use async_trait::async_trait;

/// Core trait for LLM clients
///
/// One call is one round-trip: the full conversation goes out, and the model's
/// next turn (text and/or tool calls) comes back.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Provider name (e.g. "anthropic")
    fn provider_name(&self) -> &str;

    /// Model id requests are sent with
    fn model_name(&self) -> &str;
}
