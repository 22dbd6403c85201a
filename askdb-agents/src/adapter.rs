//! Conversion between Tool Channel descriptors/results and the LLM tool protocol

use askdb_llm_sdk::tools::{Tool, ToolCall, ToolResult};
use askdb_tools::{CallToolResult, ChannelError, ToolDescriptor};
use schemars::schema::{InstanceType, Metadata, ObjectValidation, RootSchema, Schema, SchemaObject};

/// Provider tool definition for a channel descriptor. Never fails.
pub fn to_provider_tool(descriptor: &ToolDescriptor) -> Tool {
    let description = descriptor
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("Tool: {}", descriptor.name));

    let declared = descriptor
        .input_schema
        .as_ref()
        .filter(|schema| schema.as_object().is_some_and(|map| !map.is_empty()));

    if let Some(schema) = declared {
        match Tool::from_json_schema(&descriptor.name, &description, schema.clone()) {
            Ok(tool) => return tool,
            Err(e) => tracing::warn!(
                tool_name = %descriptor.name,
                error = %e,
                "Declared input schema is unusable, synthesizing one"
            ),
        }
    }

    Tool::new(
        &descriptor.name,
        description,
        synthesize_input_schema(&descriptor.name),
    )
}

/// Name-based input shape for tools that declare none.
///
/// Names containing `sql` or `execute` get one required string `query`;
/// everything else gets an empty parameter object, even if the tool
/// actually needs arguments.
pub fn synthesize_input_schema(name: &str) -> RootSchema {
    let lowered = name.to_lowercase();
    let mut object = ObjectValidation::default();

    if lowered.contains("sql") || lowered.contains("execute") {
        let query = SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            metadata: Some(Box::new(Metadata {
                description: Some("Consulta SQL a ejecutar".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        };
        object
            .properties
            .insert("query".to_string(), Schema::Object(query));
        object.required.insert("query".to_string());
    }

    RootSchema {
        meta_schema: None,
        schema: SchemaObject {
            instance_type: Some(InstanceType::Object.into()),
            object: Some(Box::new(object)),
            ..Default::default()
        },
        definitions: Default::default(),
    }
}

/// Tool result for the model; channel failures become readable error text
pub fn to_tool_result(call: &ToolCall, outcome: Result<CallToolResult, ChannelError>) -> ToolResult {
    match outcome {
        Ok(result) if result.is_error => ToolResult::error(call.id(), result.content),
        Ok(result) => ToolResult::text(call.id(), result.content),
        Err(e) => ToolResult::error(
            call.id(),
            format!("Error ejecutando herramienta {}: {}", call.name(), e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn descriptor(name: &str, description: Option<&str>, schema: Option<Value>) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_string(),
            description: description.map(str::to_string),
            input_schema: schema,
        }
    }

    #[test]
    fn test_declared_schema_is_kept() {
        let tool = to_provider_tool(&descriptor(
            "execute_sql",
            Some("Ejecuta SQL"),
            Some(json!({
                "type": "object",
                "properties": {"query": {"type": "string"}, "limit": {"type": "integer"}},
                "required": ["query"]
            })),
        ));

        assert_eq!(tool.name(), "execute_sql");
        assert_eq!(tool.description(), "Ejecuta SQL");
        assert_eq!(tool.parameters_json()["properties"]["limit"]["type"], "integer");
    }

    #[test]
    fn test_sql_like_names_get_query_parameter() {
        for name in ["execute_sql", "run_SQL", "execute_statement"] {
            let tool = to_provider_tool(&descriptor(name, None, None));
            let schema = tool.parameters_json();
            assert_eq!(schema["type"], "object", "{name}");
            assert_eq!(schema["properties"]["query"]["type"], "string", "{name}");
            assert_eq!(schema["required"], json!(["query"]), "{name}");
        }
    }

    #[test]
    fn test_other_names_get_empty_shape() {
        let tool = to_provider_tool(&descriptor("get_context", None, Some(json!({}))));
        let schema = tool.parameters_json();

        assert_eq!(tool.description(), "Tool: get_context");
        assert_eq!(schema["type"], "object");
        assert!(schema.get("required").map_or(true, |r| r == &json!([])));
        assert!(schema["properties"].as_object().map_or(true, |p| p.is_empty()));
    }

    #[test]
    fn test_unusable_schema_falls_back() {
        let tool = to_provider_tool(&descriptor(
            "execute_sql",
            Some("Ejecuta SQL"),
            Some(json!({"type": 42})),
        ));
        assert_eq!(tool.parameters_json()["required"], json!(["query"]));
    }

    #[test]
    fn test_adapter_is_deterministic() {
        let d = descriptor("lookup", Some("Busca"), None);
        assert_eq!(
            to_provider_tool(&d).parameters_json(),
            to_provider_tool(&d).parameters_json()
        );
    }

    #[test]
    fn test_channel_error_becomes_text() {
        let call = ToolCall::new("toolu_9", "execute_sql", json!({}));
        let result = to_tool_result(
            &call,
            Err(ChannelError::InvalidArguments {
                tool: "execute_sql".to_string(),
                message: "missing field `query`".to_string(),
            }),
        );

        assert!(result.is_error());
        assert_eq!(result.tool_call_id(), "toolu_9");
        assert!(result
            .content()
            .starts_with("Error ejecutando herramienta execute_sql: "));
        assert!(result.content().contains("missing field `query`"));
    }

    #[test]
    fn test_error_flag_is_forwarded() {
        let call = ToolCall::new("toolu_1", "execute_sql", json!({"query": "x"}));
        let result = to_tool_result(&call, Ok(CallToolResult::error("Error ejecutando SQL: boom")));
        assert!(result.is_error());
        assert_eq!(result.content(), "Error ejecutando SQL: boom");
    }
}
