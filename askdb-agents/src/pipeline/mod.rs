//! Explicit question pipeline: route, generate SQL, clean, execute, interpret

use crate::prompts;
use crate::types::{model_error_text, GenerationLimits, QueryResponse};
use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::error::LlmError;
use askdb_llm_sdk::types::CompletionRequest;
use askdb_tools::schema;
use askdb_tools::sqlite::{self, QueryResult, SqlExecutor};
use askdb_tools::ToolError;
use rusqlite::Connection;
use std::sync::Arc;

pub mod sql_cleaner;

pub use sql_cleaner::clean_sql;


const CONTEXT_LABEL: &str = "contexto";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Context,
    Sql,
}

/// Only the exact label `contexto`, after trimming whitespace, selects the
/// context path. Anything else, including malformed output, routes to SQL.
pub fn parse_route(raw: &str) -> Route {
    if raw.trim() == CONTEXT_LABEL {
        Route::Context
    } else {
        Route::Sql
    }
}

/// The relational store as seen by the pipeline
pub trait QueryEngine: Send {
    /// Rendered schema report
    fn schema_text(&self) -> Result<String, ToolError>;

    fn execute(&self, sql: &str) -> Result<QueryResult, ToolError>;
}

/// SQLite file opened for a single question; closed on drop
pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    pub fn open(db_path: &str) -> Result<Self, ToolError> {
        Ok(Self {
            conn: sqlite::open_database(db_path)?,
        })
    }
}

impl QueryEngine for SqliteEngine {
    fn schema_text(&self) -> Result<String, ToolError> {
        let descriptor = schema::describe(&self.conn)?;
        Ok(schema::render(&descriptor))
    }

    fn execute(&self, sql: &str) -> Result<QueryResult, ToolError> {
        SqlExecutor::new(&self.conn).execute(sql)
    }
}

pub struct SqlPipeline {
    client: Arc<dyn LlmClient>,
    limits: GenerationLimits,
}

impl SqlPipeline {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            limits: GenerationLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: GenerationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Answer one question. Failures become the response text; a failed
    /// statement is returned verbatim as `sql_query` next to the engine error.
    pub async fn run(
        &self,
        question: &str,
        context: &str,
        engine: &mut dyn QueryEngine,
    ) -> QueryResponse {
        let schema_text = match engine.schema_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Schema introspection failed");
                return QueryResponse::answer(format!("Error obteniendo esquema: {}", e));
            }
        };

        let route = match self.decide(question, context).await {
            Ok(route) => route,
            Err(e) => return QueryResponse::answer(model_error_text(e)),
        };

        match route {
            Route::Context => {
                match self
                    .ask(prompts::context_answer_prompt(question, context))
                    .await
                {
                    Ok(text) => QueryResponse::answer(text),
                    Err(e) => QueryResponse::answer(model_error_text(e)),
                }
            }
            Route::Sql => {
                self.answer_with_sql(question, context, &schema_text, engine)
                    .await
            }
        }
    }

    pub async fn decide(&self, question: &str, context: &str) -> Result<Route, LlmError> {
        let raw = self
            .ask(prompts::decision_prompt(question, context))
            .await?;
        let route = parse_route(&raw);
        tracing::info!(route = ?route, raw_decision = %raw.trim(), "Routing decision");
        Ok(route)
    }

    async fn answer_with_sql(
        &self,
        question: &str,
        context: &str,
        schema_text: &str,
        engine: &mut dyn QueryEngine,
    ) -> QueryResponse {
        let generated = match self
            .ask(prompts::sql_generation_prompt(question, context, schema_text))
            .await
        {
            Ok(text) => text,
            Err(e) => return QueryResponse::answer(model_error_text(e)),
        };

        let sql = clean_sql(&generated);
        if sql.is_empty() {
            return QueryResponse::answer("No se pudo generar una consulta SQL para la pregunta.");
        }
        tracing::info!(sql = %sql, "Executing generated SQL");

        let records = match engine
            .execute(&sql)
            .and_then(|result| sqlite::format_records(&result))
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(sql = %sql, error = %e, "Generated SQL failed");
                let message = format!("Error ejecutando SQL: {}", e);
                return QueryResponse::with_sql(sql, message);
            }
        };

        match self
            .ask(prompts::interpretation_prompt(question, &sql, &records))
            .await
        {
            Ok(text) => QueryResponse::with_sql(sql, text),
            Err(e) => QueryResponse::with_sql(sql, model_error_text(e)),
        }
    }

    async fn ask(&self, prompt: String) -> Result<String, LlmError> {
        let request = CompletionRequest::prompt(
            self.client.model_name(),
            prompt,
            self.limits.max_tokens,
        )
        .with_temperature(self.limits.temperature);

        let response = self.client.complete(request).await?;
        Ok(response.joined_text())
    }
}
