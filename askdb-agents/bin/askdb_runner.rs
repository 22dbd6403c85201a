use askdb_agents::{Assistant, FlowMode, QueryRequest, StdioChannelFactory};
use askdb_llm_sdk::claude::ClaudeClient;
use askdb_llm_sdk::client::LlmClient;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database to query
    #[arg(short, long)]
    db_path: String,

    /// Question in natural language
    #[arg(short, long)]
    question: String,

    /// Company context as inline text
    #[arg(short, long, conflicts_with = "context_file")]
    context: Option<String>,

    /// File holding the company context
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Flow to use: "tools" or "pipeline"
    #[arg(short, long, default_value = "pipeline")]
    mode: FlowMode,

    /// Model id or display name, e.g. "Claude 3 Haiku"
    #[arg(long)]
    model: Option<String>,

    /// Run tools through this askdb-tool-server binary instead of in-process
    #[arg(long)]
    tool_server: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY must be set"))?;

    let mut client = ClaudeClient::new(api_key)?;
    if let Some(model) = &args.model {
        client = client.with_model(model);
    }
    let client: Arc<dyn LlmClient> = Arc::new(client);

    let context = match (&args.context, &args.context_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => String::new(),
    };

    let mut assistant = Assistant::new(client.clone());
    if let Some(program) = &args.tool_server {
        assistant = assistant.with_channel_factory(Arc::new(StdioChannelFactory::new(program)));
    }

    println!("Model: {}", client.model_name());
    println!("Question: {}\n", args.question);

    let response = assistant
        .ask(QueryRequest {
            question: args.question,
            context,
            db_path: args.db_path,
            mode: args.mode,
        })
        .await;

    if !response.sql_query.is_empty() {
        println!("--- SQL ---\n{}\n", response.sql_query);
    }
    println!("--- Answer ---\n{}", response.response);

    Ok(())
}
