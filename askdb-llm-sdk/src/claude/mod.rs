//! Claude (Anthropic) LLM client implementation

pub mod client;
pub mod tools;
pub mod types;

pub use client::ClaudeClient;
pub use tools::ClaudeToolFormat;
