//! The three tools exposed to the model and their dispatch
//!
//! Tool outputs are always text. Failures inside a tool (bad SQL, catalog
//! errors) come back as `is_error` results with a Spanish prefix; only
//! protocol-level problems (no session, unknown tool, malformed arguments)
//! are `ChannelError`s.

use crate::channel::{CallToolResult, ChannelError, SessionConfig, ToolDescriptor};
use crate::schema;
use crate::sqlite::{self, SqlExecutor};
use rusqlite::Connection;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

pub const SCHEMA_TOOL: &str = "get_database_schema_tool";
pub const EXECUTE_SQL_TOOL: &str = "execute_sql";
pub const CONTEXT_TOOL: &str = "get_context";

/// Arguments of `get_database_schema_tool`
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetSchemaParams {}

/// Arguments of `execute_sql`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteSqlParams {
    /// Consulta SQL a ejecutar
    pub query: String,
}

/// Arguments of `get_context`
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetContextParams {}

struct Session {
    conn: Connection,
    context: String,
    descriptors: Vec<ToolDescriptor>,
}

/// Tool server state: at most one live session
#[derive(Default)]
pub struct ToolServer {
    session: Option<Session>,
}

impl ToolServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Handshake: open the session database and fix the tool list
    pub fn initialize(&mut self, config: &SessionConfig) -> Result<(), ChannelError> {
        if self.session.is_some() {
            return Err(ChannelError::Protocol(
                "session already initialized".to_string(),
            ));
        }

        let conn = sqlite::open_database(&config.db_path)
            .map_err(|e| ChannelError::Handshake(e.to_string()))?;

        tracing::info!(db_path = %config.db_path, "Tool session initialized");
        self.session = Some(Session {
            conn,
            context: config.context.clone(),
            descriptors: descriptors(),
        });
        Ok(())
    }

    pub fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ChannelError> {
        Ok(self.session()?.descriptors.clone())
    }

    pub fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ChannelError> {
        let session = self.session()?;

        match name {
            SCHEMA_TOOL => {
                parse_arguments::<GetSchemaParams>(name, arguments)?;
                Ok(schema_tool(&session.conn))
            }
            EXECUTE_SQL_TOOL => {
                let params = parse_arguments::<ExecuteSqlParams>(name, arguments)?;
                Ok(execute_sql_tool(&session.conn, &params.query))
            }
            CONTEXT_TOOL => {
                parse_arguments::<GetContextParams>(name, arguments)?;
                Ok(context_tool(&session.context))
            }
            other => Err(ChannelError::UnknownTool(other.to_string())),
        }
    }

    /// Drop the session and its connection
    pub fn shutdown(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("Tool session closed");
        }
    }

    fn session(&self) -> Result<&Session, ChannelError> {
        self.session.as_ref().ok_or(ChannelError::NotConnected)
    }
}

fn schema_tool(conn: &Connection) -> CallToolResult {
    match schema::describe(conn) {
        Ok(descriptor) => CallToolResult::text(schema::render(&descriptor)),
        Err(e) => CallToolResult::error(format!("Error obteniendo esquema: {}", e)),
    }
}

fn execute_sql_tool(conn: &Connection, query: &str) -> CallToolResult {
    let outcome = SqlExecutor::new(conn)
        .execute(query)
        .and_then(|result| sqlite::format_records(&result));

    match outcome {
        Ok(text) => CallToolResult::text(text),
        Err(e) => {
            tracing::debug!(error = %e, "SQL tool failed");
            CallToolResult::error(format!("Error ejecutando SQL: {}", e))
        }
    }
}

fn context_tool(context: &str) -> CallToolResult {
    CallToolResult::text(context)
}

fn parse_arguments<T>(tool: &str, arguments: Value) -> Result<T, ChannelError>
where
    T: for<'de> Deserialize<'de>,
{
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => arguments,
        other => {
            return Err(ChannelError::InvalidArguments {
                tool: tool.to_string(),
                message: format!("expected an object, got {}", other),
            })
        }
    };

    serde_json::from_value(arguments).map_err(|e| ChannelError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn input_schema<T: JsonSchema>() -> Value {
    use schemars::gen::SchemaSettings;

    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let schema = settings.into_generator().into_root_schema_for::<T>();
    serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: SCHEMA_TOOL.to_string(),
            description: Some(
                "Obtiene el esquema completo de la base de datos: tablas, columnas, claves, \
                 relaciones, índices y filas de ejemplo."
                    .to_string(),
            ),
            input_schema: Some(input_schema::<GetSchemaParams>()),
        },
        ToolDescriptor {
            name: EXECUTE_SQL_TOOL.to_string(),
            description: Some(
                "Ejecuta una consulta SQL sobre la base de datos y devuelve las filas como \
                 una lista de objetos JSON."
                    .to_string(),
            ),
            input_schema: Some(input_schema::<ExecuteSqlParams>()),
        },
        ToolDescriptor {
            name: CONTEXT_TOOL.to_string(),
            description: Some("Devuelve el contexto de negocio de la empresa.".to_string()),
            input_schema: Some(input_schema::<GetContextParams>()),
        },
    ]
}
