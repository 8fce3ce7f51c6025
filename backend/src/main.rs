//! Smart Agriculture backend server

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agri_server::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; AGRI_LOG_FORMAT=json switches to structured output
    let json_logs = std::env::var("AGRI_LOG_FORMAT").map_or(false, |format| format == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agri_server=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Smart Agriculture Server");
    tracing::info!("Environment: {}", config.environment);
    if let Some(seed) = config.simulation.seed {
        tracing::info!(seed, "Simulated readings are seeded");
    }

    let addr = config.bind_address();
    let state = AppState::from_config(config)?;
    tracing::info!(sites = state.sites.len(), "Site table loaded");

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
