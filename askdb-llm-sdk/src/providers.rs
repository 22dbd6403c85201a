//! Provider identifiers reported by `LlmClient::provider_name`

pub const ANTHROPIC: &str = "anthropic";
