//! # CrickFan API Server
//!
//! Loads configuration from the environment, applies database migrations
//! and serves the HTTP API until Ctrl-C.
//!
//! ```bash
//! cargo run -p crickfan-api
//! ```

use crickfan_api::{
    app::{build_router, AppState},
    config::Config,
};
use crickfan_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
    provider::client::CricApiClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "crickfan_api=debug,crickfan_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "CrickFan API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    let provider = Arc::new(CricApiClient::new(config.provider_config())?);

    let address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, provider));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
}
