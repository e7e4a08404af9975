use std::process::ExitCode;
use std::sync::Arc;

use n8n_mcp::rmcp::{transport::stdio, ServiceExt};
use n8n_mcp::{ConnectionConfig, N8nApi, N8nServer, ToolRouter};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the MCP protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ConnectionConfig::from_env()?;
    info!(endpoint = %config.root(), "starting n8n MCP server");

    let api = N8nApi::new(config)?;
    let router = ToolRouter::new(Arc::new(api))?;
    info!(tools = router.catalog().len(), "tool catalog ready");

    let service = N8nServer::new(router).serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
