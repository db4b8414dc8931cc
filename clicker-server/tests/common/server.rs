//! Test server harness for integration tests.
//!
//! Spins up the real API router on a random port so tests can drive it with
//! an HTTP client.

use std::net::SocketAddr;
use std::sync::Arc;

use clicker_core::{EngineConfig, GameEngine, GameStore, ManualClock};
use clicker_server::{router, AppState};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

/// A test server instance with control handles.
pub struct TestServer {
    addr: SocketAddr,
    state: AppState,
    clock: Arc<ManualClock>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default settings and an in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or server fails to bind.
    #[allow(dead_code)]
    pub async fn start() -> Self {
        Self::start_with(GameStore::new(), EngineConfig::default()).await
    }

    /// Start a server over `store` with `config`, driven by a manual clock
    /// starting at zero.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or server fails to bind.
    pub async fn start_with(store: GameStore, config: EngineConfig) -> Self {
        let port = portpicker::pick_unused_port().expect("no available port");
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let clock = Arc::new(ManualClock::new(0));
        let engine = GameEngine::new(store, config)
            .expect("engine")
            .with_clock(clock.clone());
        let state = AppState::new(engine);

        let app = router(state.clone())
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any));

        let listener = TcpListener::bind(addr).await.expect("failed to bind");
        let actual_addr = listener.local_addr().expect("failed to get local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("server error");
        });

        // Give the server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Self {
            addr: actual_addr,
            state,
            clock,
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    /// Base URL for API requests.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// The clock the engine reads.
    #[allow(dead_code)]
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Direct access to the engine (for test setup and assertions).
    #[allow(dead_code)]
    pub fn engine(&self) -> &GameEngine {
        &self.state.engine
    }

    /// Gracefully shut down the server.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(tokio::time::Duration::from_secs(5), self.handle).await;
    }
}
