//! Phenosaurus Web Server
//!
//! Run with: cargo run -p phenosaurus-web

use std::net::SocketAddr;

use phenosaurus_common::Config;
use phenosaurus_db::Database;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phenosaurus=debug,info")),
        )
        .init();

    info!("Starting Phenosaurus web server...");

    let config = Config::load().unwrap_or_else(|e| {
        warn!("{e}; using defaults");
        Config::default()
    });

    let db = Database::open(&config.database.url, config.database.max_connections).await?;
    db.initialize().await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = phenosaurus_web::state::AppState::new(db.into_shared(), config)?;
    let app = phenosaurus_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
