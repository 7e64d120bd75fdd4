mod api;
mod constants;
mod node;

use clap::Parser;
use constants::{DEFAULT_LISTEN, DEFAULT_MINE_RATE_MS};
use ledger_core::{BlockEngine, EngineConfig};
use node::Node;
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Target interval between blocks, in milliseconds
    #[arg(long, default_value_t = DEFAULT_MINE_RATE_MS)]
    mine_rate_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = EngineConfig::from_millis(args.mine_rate_ms);
    info!(mine_rate = ?config.mine_rate, "starting from genesis");
    let node = Arc::new(Node::new(BlockEngine::new(config)));

    let app = api::router(Arc::clone(&node));
    let addr: SocketAddr = args.listen.parse()?;
    info!("ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal(node))
        .await?;
    Ok(())
}

/// Waits for ctrl-c, then stops in-flight searches so their requests can finish.
async fn shutdown_signal(node: Arc<Node>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
    node.cancel_mining().await;
}
