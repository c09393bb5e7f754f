//! Read-only web API over the metric store.
//!
//! Serves JSON snapshots, the dashboard's rolling series, assistant prompts
//! and a WebSocket stream of snapshots. Nothing here mutates the store.

pub mod config;
pub mod handlers;
pub mod router;
pub mod websocket;

// Re-export commonly used items
pub use config::WebConfig;
pub use router::create_app;

use crate::consumers::{snapshot_stream, DashboardSeries};
use crate::error::{HubError, Result};
use crate::store::{MetricStore, StoreView};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tokio_stream::StreamExt;
use tracing::info;
use uuid::Uuid;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetricStore>,
    pub dashboard: Arc<RwLock<DashboardSeries>>,
    pub snapshots: broadcast::Sender<StoreView>,
    pub clients: Arc<RwLock<HashMap<Uuid, websocket::Client>>>,
    pub max_websocket_connections: usize,
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(store: Arc<MetricStore>, config: &WebConfig) -> Self {
        let (snapshots, _rx) = broadcast::channel(16);
        let (shutdown, _closing) = watch::channel(false);
        Self {
            dashboard: Arc::new(RwLock::new(DashboardSeries::new(store.capacity()))),
            store,
            snapshots,
            clients: Arc::new(RwLock::new(HashMap::new())),
            max_websocket_connections: config.max_websocket_connections,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Tell open WebSocket streams to close.
    fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Start the web server and run it until `shutdown` resolves.
pub async fn start_web_server<F>(
    config: WebConfig,
    store: Arc<MetricStore>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AppState::new(store, &config);
    let app = create_app(state.clone(), &config);

    // Parse the bind address
    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| HubError::config_error(format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HubError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    info!("Web API available at http://{}/", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    let feed_task = tokio::spawn(run_feed(state.clone(), config.refresh_interval_ms));

    let closing = state.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            closing.begin_shutdown();
        })
        .await
        .map_err(|e| HubError::web_server_error(format!("Server error: {}", e)));

    feed_task.abort();
    info!("Web server stopped");
    result
}

/// Refresh the dashboard series and broadcast each snapshot to WebSocket
/// clients.
async fn run_feed(state: AppState, interval_ms: u64) {
    let mut feed = snapshot_stream(Arc::clone(&state.store), interval_ms);
    while let Some(view) = feed.next().await {
        state.dashboard.write().await.refresh(&view);
        // No subscribers is the common case between dashboard sessions.
        let _ = state.snapshots.send(view);
    }
}
