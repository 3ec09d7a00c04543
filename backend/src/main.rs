//! PAM crop yield prediction server

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pam_server::{create_app, services::Dataset, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pam_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting PAM yield prediction server");
    tracing::info!("Environment: {}", config.environment);

    let dataset = Dataset::load(&config.data.csv_path)
        .with_context(|| format!("loading dataset {}", config.data.csv_path.display()))?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let warm_start = config.model.warm_start;

    let state = AppState::new(config, dataset);

    if warm_start {
        tracing::info!("Resolving model before accepting requests...");
        let loaded = state.registry.get_or_init().await?;
        tracing::info!(source = loaded.source.label(), "Model ready");
    }

    // Build application
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
