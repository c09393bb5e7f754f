//! Web application router and middleware setup.

use crate::web::config::WebConfig;
use crate::web::{handlers, websocket, AppState};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the axum application with all routes and middleware.
pub fn create_app(state: AppState, config: &WebConfig) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::default_index))
        // API routes
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/prompt", get(handlers::get_prompt))
        .route("/api/health", get(handlers::health_check))
        // WebSocket route
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state);

    // Add CORS if enabled
    if config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
