//! Question answering over a SQLite database.
//!
//! Two flows are available per question:
//! - [`tool_loop`]: the model drives the `get_database_schema_tool`,
//!   `execute_sql` and `get_context` tools through a Tool Channel.
//! - [`pipeline`]: one routing call picks between answering from the company
//!   context or generating, executing and interpreting SQL.
//!
//! [`Assistant`] selects the flow from the request and owns nothing between
//! questions.

pub mod adapter;
pub mod assistant;
pub mod pipeline;
pub mod prompts;
pub mod tool_loop;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use assistant::{Assistant, ChannelFactory, LocalChannelFactory, StdioChannelFactory};
pub use pipeline::{clean_sql, parse_route, QueryEngine, Route, SqlPipeline, SqliteEngine};
pub use tool_loop::{LoopOutcome, LoopReport, ToolCallingAgent};
pub use types::{FlowMode, GenerationLimits, LoopConfig, QueryRequest, QueryResponse};
