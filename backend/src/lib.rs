//! Smart Agriculture backend
//!
//! Weather, irrigation and crop monitoring services for a farm operations
//! dashboard, served over HTTP with streaming endpoints for live feeds.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ndjson;
pub mod routes;
pub mod services;
pub mod simulation;

pub use config::Config;

use error::AppResult;
use services::{HealthPolicy, MaintainCurrentCare, SiteTable};
use simulation::{Clock, Entropy, SystemClock};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sites: Arc<SiteTable>,
    pub entropy: Arc<dyn Entropy>,
    pub clock: Arc<dyn Clock>,
    pub health_policy: Arc<dyn HealthPolicy>,
}

impl AppState {
    /// Build the state from loaded configuration, with system clock and
    /// entropy seeded from `simulation.seed` when set
    pub fn from_config(config: Config) -> AppResult<Self> {
        let sites = SiteTable::from_config(&config)?;
        let entropy: Arc<dyn Entropy> = Arc::from(simulation::entropy_for_seed(config.simulation.seed));

        Ok(Self {
            config: Arc::new(config),
            sites: Arc::new(sites),
            entropy,
            clock: Arc::new(SystemClock),
            health_policy: Arc::new(MaintainCurrentCare),
        })
    }

    pub fn with_entropy(mut self, entropy: impl Entropy + 'static) -> Self {
        self.entropy = Arc::new(entropy);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_health_policy(mut self, policy: impl HealthPolicy + 'static) -> Self {
        self.health_policy = Arc::new(policy);
        self
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Smart Agriculture API v1.0"
}
