use askdb_tools::{ChannelError, SessionConfig, StdioChannel, ToolChannel};
use rusqlite::Connection;
use serde_json::json;
use tempfile::NamedTempFile;

const SERVER_BIN: &str = env!("CARGO_BIN_EXE_askdb-tool-server");

fn create_database() -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let conn = Connection::open(temp_file.path()).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE productos (id INTEGER PRIMARY KEY, nombre TEXT NOT NULL, categoria TEXT);
        INSERT INTO productos (nombre, categoria) VALUES ('Laptop', 'Computación');
        INSERT INTO productos (nombre, categoria) VALUES ('Audífonos', 'Audio');
        "#,
    )
    .unwrap();
    temp_file
}

#[tokio::test]
async fn test_calls_before_handshake_fail_loudly() {
    let mut channel = StdioChannel::spawn(SERVER_BIN).unwrap();
    assert_eq!(channel.list_tools().await, Err(ChannelError::NotConnected));
}

#[tokio::test]
async fn test_full_session_over_stdio() {
    let db = create_database();
    let config = SessionConfig::new(db.path().to_str().unwrap(), "Tienda de tecnología");
    let mut channel = StdioChannel::connect(SERVER_BIN, config).await.unwrap();

    let tools = channel.list_tools().await.unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["get_database_schema_tool", "execute_sql", "get_context"]);
    assert_eq!(tools, channel.list_tools().await.unwrap());

    let count = channel
        .call_tool("execute_sql", json!({"query": "SELECT COUNT(*) AS total FROM productos"}))
        .await
        .unwrap();
    assert_eq!(count.content, r#"[{"total":2}]"#);

    let failure = channel
        .call_tool("execute_sql", json!({"query": "SELECT * FROM ventas"}))
        .await
        .unwrap();
    assert!(failure.is_error);
    assert!(failure.content.starts_with("Error ejecutando SQL:"));

    let context = channel.call_tool("get_context", json!({})).await.unwrap();
    assert_eq!(context.content, "Tienda de tecnología");

    assert_eq!(
        channel.call_tool("borrar_todo", json!({})).await,
        Err(ChannelError::UnknownTool("borrar_todo".to_string()))
    );
    assert!(matches!(
        channel.call_tool("execute_sql", json!({})).await,
        Err(ChannelError::InvalidArguments { .. })
    ));

    channel.close().await.unwrap();
    assert_eq!(
        channel.call_tool("get_context", json!({})).await,
        Err(ChannelError::NotConnected)
    );
}

#[tokio::test]
async fn test_handshake_failure_for_missing_database() {
    let config = SessionConfig::new("/no/existe.db", "");
    let result = StdioChannel::connect(SERVER_BIN, config).await;
    assert!(matches!(result, Err(ChannelError::Handshake(msg)) if msg.contains("not found")));
}

#[tokio::test]
async fn test_spawn_failure_is_transport_error() {
    let result = StdioChannel::spawn("/no/such/askdb-tool-server");
    assert!(matches!(result, Err(ChannelError::Transport(_))));
}
