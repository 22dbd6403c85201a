use serde::{Deserialize, Serialize};

/// Bounded generation settings sent with every model request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationLimits {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    /// Hard ceiling on model round-trips per question
    pub max_iterations: usize,
    pub limits: GenerationLimits,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            limits: GenerationLimits::default(),
        }
    }
}

/// Which flow answers a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    /// Model-driven tool calling over a Tool Channel
    #[serde(rename = "tools")]
    ToolCalling,
    /// Explicit decision, generation, execution and interpretation stages
    #[default]
    Pipeline,
}

impl std::str::FromStr for FlowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tools" | "tool-calling" | "tool_calling" => Ok(FlowMode::ToolCalling),
            "pipeline" => Ok(FlowMode::Pipeline),
            other => Err(format!(
                "Unknown mode '{}', expected 'tools' or 'pipeline'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub question: String,
    pub context: String,
    pub db_path: String,
    pub mode: FlowMode,
}

/// Answer to one question; `sql_query` is empty unless the pipeline ran SQL
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    pub sql_query: String,
    pub response: String,
}

impl QueryResponse {
    pub fn answer(response: impl Into<String>) -> Self {
        Self {
            sql_query: String::new(),
            response: response.into(),
        }
    }

    pub fn with_sql(sql_query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            sql_query: sql_query.into(),
            response: response.into(),
        }
    }
}

/// User-facing text for a failed model call
pub fn model_error_text(error: impl std::fmt::Display) -> String {
    format!("Error en conversación con el modelo: {}", error)
}
