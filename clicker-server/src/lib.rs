//! # Clicker Server Library
//!
//! HTTP API over the clicker game engine.
//! This library is used by both the binary and integration tests.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use clicker_core::{EngineResult, GameEngine, GameStore, UpgradeCatalog};

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod validation;

pub use config::{CliArgs, ServerConfig};
pub use error::ApiError;

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The game engine all handlers run against.
    pub engine: Arc<GameEngine>,
}

impl AppState {
    /// Wrap an engine.
    pub fn new(engine: GameEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Build the engine described by `config`.
    ///
    /// With a data directory, previously saved sessions are loaded before
    /// the state is returned.
    ///
    /// # Errors
    ///
    /// Fails if the data directory or catalog file cannot be read, or the
    /// engine settings are invalid.
    pub fn from_config(config: &ServerConfig) -> EngineResult<Self> {
        let store = match &config.data_dir {
            Some(dir) => {
                let store = GameStore::with_data_dir(dir)?;
                let loaded = store.load_all_from_disk()?;
                tracing::info!(count = loaded.len(), dir = %dir.display(), "Loaded saved sessions");
                store
            }
            None => GameStore::new(),
        };

        let mut engine = GameEngine::new(store, config.engine)?;
        if let Some(path) = &config.catalog {
            let catalog = UpgradeCatalog::from_file(path)?;
            tracing::info!(
                upgrades = catalog.upgrades().len(),
                path = %path.display(),
                "Loaded upgrade catalog"
            );
            engine = engine.with_catalog(catalog);
        }

        metrics::set_sessions(engine.store().len());
        Ok(Self::new(engine))
    }
}

/// Build the API and health routes with request metrics.
///
/// The binary adds `/metrics`, CORS, tracing and request-id layers on top.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness))
        .route("/api/upgrades", get(routes::list_upgrades))
        .route("/api/game/start", post(routes::start_game))
        .route("/api/game/{id}", get(routes::get_game))
        .route("/api/game/{id}/click", post(routes::click))
        .route("/api/game/{id}/passive", post(routes::passive_tick))
        .route("/api/game/{id}/upgrade", post(routes::purchase_upgrade))
        .route("/api/game/{id}/prestige", post(routes::prestige))
        .layer(middleware::from_fn(metrics::track_http))
        .with_state(state)
}
