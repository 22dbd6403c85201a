use crate::tool_error::ToolError;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::time::Instant;

const EMPTY_STATEMENT: &str = "the query contains no SQL statement";

/// Rows returned by one statement, in engine order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows re-shaped as column-name → value objects, column order preserved
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }
}

/// Runs statements verbatim on a borrowed connection
pub struct SqlExecutor<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlExecutor<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Execute one statement
    ///
    /// Statements without result columns (DDL, DML) still run to completion
    /// and yield an empty result. Blank or comment-only input is
    /// `InvalidInput` rather than the engine's generic misuse error.
    pub fn execute(&self, query: &str) -> Result<QueryResult, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::InvalidInput(EMPTY_STATEMENT.to_string()));
        }
        let start_time = Instant::now();

        let (columns, rows) = self.run(query).map_err(|e| match e {
            // comment-only SQL prepares to no statement; stepping it is misuse
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == rusqlite::ErrorCode::ApiMisuse =>
            {
                ToolError::InvalidInput(EMPTY_STATEMENT.to_string())
            }
            other => ToolError::from(other),
        })?;

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(rows = rows.len(), execution_time_ms, "SQL statement executed");

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms,
        })
    }

    fn run(&self, query: &str) -> rusqlite::Result<(Vec<String>, Vec<Vec<Value>>)> {
        let mut stmt = self.conn.prepare(query)?;
        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|&name| name.to_string())
            .collect();
        let column_count = columns.len();

        let mut rows = stmt.query([])?;
        let mut result_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(value_to_json(row.get_ref(i)?));
            }
            result_rows.push(values);
        }
        Ok((columns, result_rows))
    }
}

/// Map one SQLite value onto JSON
pub fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(serde_json::Number::from(i)),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(s) => Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Value::String(format!("<BLOB {} bytes>", b.len())),
    }
}
