//! Orchestration loop for the tool-calling flow
//!
//! The model sees the question plus the channel's tools. Each round-trip either
//! ends with text or requests tool calls; requested calls run in order through
//! the [`ToolChannel`] and their results go back in a single user message,
//! matched by invocation id. Model failures end the loop with their text, and
//! the round-trip count never exceeds [`LoopConfig::max_iterations`].

use crate::adapter::{to_provider_tool, to_tool_result};
use crate::prompts;
use crate::types::{model_error_text, LoopConfig};
use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::tools::{Tool, ToolChoice};
use askdb_llm_sdk::types::{CompletionRequest, ContentBlock, Message, Role};
use askdb_tools::{ChannelError, ToolChannel};
use std::sync::Arc;
use std::time::Instant;


pub const MAX_ITERATIONS_MESSAGE: &str =
    "Se alcanzó el máximo de iteraciones. Intenta reformular tu pregunta.";

#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// Final text of the model; may be empty if it returned nothing at all
    Answered(String),
    BudgetExhausted,
    /// The model call itself failed; the loop does not retry
    ModelError(String),
}

impl LoopOutcome {
    pub fn into_response_text(self) -> String {
        match self {
            LoopOutcome::Answered(text) => text,
            LoopOutcome::BudgetExhausted => MAX_ITERATIONS_MESSAGE.to_string(),
            LoopOutcome::ModelError(message) => model_error_text(message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    /// Number of model round-trips made
    pub iterations: usize,
    pub conversation: Vec<Message>,
}

pub struct ToolCallingAgent {
    client: Arc<dyn LlmClient>,
    config: LoopConfig,
    system_prompt: String,
}

impl ToolCallingAgent {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            config: LoopConfig::default(),
            system_prompt: prompts::tool_system_prompt(),
        }
    }

    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Answer `question` using the tools of an already connected channel.
    ///
    /// Only a failure to list the channel's tools is returned as an error;
    /// tool failures are fed back to the model as text.
    pub async fn run(
        &self,
        question: &str,
        channel: &mut dyn ToolChannel,
    ) -> Result<LoopReport, ChannelError> {
        let tools: Vec<Tool> = channel
            .list_tools()
            .await?
            .iter()
            .map(to_provider_tool)
            .collect();

        tracing::debug!(tool_count = tools.len(), "Prepared tools for the model");

        let mut conversation = vec![Message::user(question)];
        let mut iteration = 0;

        loop {
            if iteration >= self.config.max_iterations {
                tracing::info!(
                    iterations = iteration,
                    "Tool loop stopped: iteration ceiling reached"
                );
                return Ok(LoopReport {
                    outcome: LoopOutcome::BudgetExhausted,
                    iterations: iteration,
                    conversation,
                });
            }
            iteration += 1;

            let request = CompletionRequest {
                messages: conversation.clone(),
                max_tokens: self.config.limits.max_tokens,
                model: self.client.model_name().to_string(),
                system: Some(self.system_prompt.clone()),
                temperature: Some(self.config.limits.temperature),
                tools: (!tools.is_empty()).then(|| tools.clone()),
                tool_choice: (!tools.is_empty()).then_some(ToolChoice::Auto),
            };

            let response = match self.client.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(iteration, error = %e, "Model call failed");
                    tracing::info!(iterations = iteration, "Tool loop stopped: model error");
                    return Ok(LoopReport {
                        outcome: LoopOutcome::ModelError(e.to_string()),
                        iterations: iteration,
                        conversation,
                    });
                }
            };

            let tool_calls = response.tool_calls.clone().unwrap_or_default();

            if tool_calls.is_empty() {
                let answer = response.joined_text();
                conversation.push(Message {
                    role: Role::Assistant,
                    content: response.content,
                });
                tracing::info!(
                    iterations = iteration,
                    answer_len = answer.len(),
                    "Tool loop stopped: final answer"
                );
                return Ok(LoopReport {
                    outcome: LoopOutcome::Answered(answer),
                    iterations: iteration,
                    conversation,
                });
            }

            let mut assistant_content = response.content;
            assistant_content.extend(tool_calls.iter().map(ContentBlock::from));
            conversation.push(Message {
                role: Role::Assistant,
                content: assistant_content,
            });

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in &tool_calls {
                let start = Instant::now();
                let outcome = channel
                    .call_tool(call.name(), call.arguments().clone())
                    .await;
                let execution_time = start.elapsed().as_millis() as u64;

                let result = to_tool_result(call, outcome);
                tracing::debug!(
                    tool_name = call.name(),
                    tool_id = call.id(),
                    execution_time_ms = execution_time,
                    is_error = result.is_error(),
                    "Tool execution completed"
                );
                results.push(ContentBlock::from(result));
            }

            conversation.push(Message {
                role: Role::User,
                content: results,
            });
        }
    }
}
