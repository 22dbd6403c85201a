//! Text form of query results handed back to the model

use super::executor::QueryResult;
use crate::tool_error::ToolError;

/// Returned instead of an empty JSON array
pub const NO_RESULTS: &str = "No se encontraron resultados.";

/// Serialize the result as a JSON array of records, or the empty sentinel
pub fn format_records(result: &QueryResult) -> Result<String, ToolError> {
    if result.is_empty() {
        return Ok(NO_RESULTS.to_string());
    }

    Ok(serde_json::to_string(&result.records())?)
}
