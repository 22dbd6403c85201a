//! Tool server speaking newline-delimited JSON-RPC on stdin/stdout
//!
//! Logs go to stderr; stdout carries protocol traffic only.

use askdb_tools::channel::protocol;
use askdb_tools::server::ToolServer;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("askdb-tool-server started");
    protocol::serve(
        ToolServer::new(),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;
    tracing::info!("askdb-tool-server stopped");
    Ok(())
}
