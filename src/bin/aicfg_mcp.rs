//! MCP stdio server exposing the aicfg tools to AI agents.
//!
//! Logs go to stderr so stdout stays clean for the protocol stream.

use aicfg_cli::config::Locations;
use aicfg_cli::server::AicfgService;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let locations = Locations::from_env()?;
    tracing::info!("Starting aicfg MCP server with stdio transport");

    let service = AicfgService::new(locations)
        .serve(rmcp::transport::stdio())
        .await?;

    service.waiting().await?;

    Ok(())
}
