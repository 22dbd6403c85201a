use actix_web::{test, web, App};
use askdb_agents::{LocalChannelFactory, LoopConfig};
use askdb_api::AppState;
use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::error::LlmError;
use askdb_llm_sdk::tools::ToolCall;
use askdb_llm_sdk::types::{CompletionRequest, CompletionResponse, ContentBlock, Role, Usage};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

pub struct TestApp<S> {
    pub mock_llm_client: Arc<MockLlmClient>,
    pub app: S,
}

pub struct MockLlmClient {
    pub responses: Arc<Mutex<Vec<CompletionResponse>>>,
    pub call_count: Arc<Mutex<usize>>,
    pub models_requested: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        MockLlmClient {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            models_requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push_response(&self, response: CompletionResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.push(response);
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut call_count = self.call_count.lock().unwrap();
        *call_count += 1;
        drop(call_count);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(create_completion_response_with_text("Hay 3 ventas en la base de datos."))
        } else {
            Ok(responses.remove(0))
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Temporary SQLite database with three rows in `ventas`
pub fn setup_test_sqlite_db_with_data() -> anyhow::Result<(NamedTempFile, String)> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Failed to convert path to string"))?
        .to_string();

    let conn = Connection::open(&db_path)?;

    conn.execute(
        "CREATE TABLE ventas (
            id INTEGER PRIMARY KEY,
            producto TEXT NOT NULL,
            pais TEXT NOT NULL,
            precio REAL NOT NULL,
            fecha_venta TEXT NOT NULL
        )",
        [],
    )?;

    let ventas = vec![
        ("Notebook Pro", "Argentina", "1800.0", "2024-05-03"),
        ("Smartphone X", "Chile", "1300.0", "2024-05-17"),
        ("Auriculares", "Colombia", "150.0", "2024-06-01"),
    ];

    for (producto, pais, precio, fecha) in ventas {
        conn.execute(
            "INSERT INTO ventas (producto, pais, precio, fecha_venta) VALUES (?, ?, CAST(? AS REAL), ?)",
            [producto, pais, precio, fecha],
        )?;
    }

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM ventas", [], |row| row.get(0))?;
    assert_eq!(count, 3, "Expected 3 ventas to be inserted");

    Ok((temp_file, db_path))
}

pub fn test_state(mock: Arc<MockLlmClient>, default_db_path: &str) -> AppState {
    let models = mock.models_requested.clone();
    AppState {
        default_db_path: default_db_path.to_string(),
        loop_config: LoopConfig::default(),
        clients: Arc::new(move |model: Option<&str>| -> anyhow::Result<Arc<dyn LlmClient>> {
            models.lock().unwrap().push(model.map(str::to_string));
            let client: Arc<dyn LlmClient> = mock.clone();
            Ok(client)
        }),
        channels: Arc::new(LocalChannelFactory),
    }
}

pub async fn setup_test_app(
    default_db_path: &str,
) -> TestApp<
    impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
> {
    let mock_llm_client = Arc::new(MockLlmClient::new());
    let state = test_state(mock_llm_client.clone(), default_db_path);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(askdb_api::configure),
    )
    .await;

    TestApp {
        mock_llm_client,
        app,
    }
}

pub async fn setup_test_app_without_credentials() -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    let state = AppState {
        default_db_path: "data/demo.db".to_string(),
        loop_config: LoopConfig::default(),
        clients: Arc::new(|_: Option<&str>| -> anyhow::Result<Arc<dyn LlmClient>> {
            Err(anyhow::anyhow!("Las credenciales de Anthropic son requeridas."))
        }),
        channels: Arc::new(LocalChannelFactory),
    };

    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(askdb_api::configure),
    )
    .await
}

pub fn create_completion_response_with_tool_call(
    tool_name: &str,
    tool_args: serde_json::Value,
) -> CompletionResponse {
    CompletionResponse {
        content: vec![],
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("tool_use".to_string()),
        tool_calls: Some(vec![ToolCall::new(
            "call_123".to_string(),
            tool_name.to_string(),
            tool_args,
        )]),
    }
}

pub fn create_completion_response_with_text(text: &str) -> CompletionResponse {
    CompletionResponse {
        content: vec![ContentBlock::Text {
            text: text.to_string(),
        }],
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("end_turn".to_string()),
        tool_calls: None,
    }
}
