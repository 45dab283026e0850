use anyhow::{Context, Result};
use clap::Parser;
use server::{run, Args, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,scrawl_server=info")),
        )
        .init();

    let config = ServerConfig::from(Args::parse());
    run(config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await
    .context("server failed")
}
