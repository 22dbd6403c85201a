//! # askdb LLM SDK
//!
//! The LLM capability used by askdb: a provider-agnostic conversation model
//! with tool-use support, and an Anthropic Messages API client.
//!
//! ```rust,no_run
//! use askdb_llm_sdk::{claude::ClaudeClient, client::LlmClient, types::CompletionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClaudeClient::new("your-api-key")?;
//!     let request = CompletionRequest::prompt(client.model_name(), "¿Cuántas tablas hay?", 1024);
//!     let response = client.complete(request).await?;
//!     println!("{}", response.joined_text());
//!     Ok(())
//! }
//! ```

pub mod claude;
pub mod client;
pub mod error;
pub mod models;
pub mod providers;
pub mod tools;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
