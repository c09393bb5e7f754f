//! HTTP handlers for API endpoints.

use crate::consumers::{build_prompt, PromptContext};
use crate::store::StoreView;
use crate::web::{websocket, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
};
use serde::Deserialize;
use serde_json::json;

/// Get a consistent snapshot of every metric as JSON.
pub async fn get_snapshot(State(state): State<AppState>) -> Json<StoreView> {
    Json(state.store.snapshot())
}

/// Get the dashboard's rolling series, labels and water axis ticks.
pub async fn get_dashboard(State(state): State<AppState>) -> Json<serde_json::Value> {
    let series = state.dashboard.read().await;
    Json(json!({
        "water_cm": series.water_cm,
        "pest_totals": series.pest_totals,
        "temperature_c": series.temperature_c,
        "humidity_pct": series.humidity_pct,
        "water_ticks": series.water_ticks(),
        "labels": series.labels,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub question: String,
}

/// Build an assistant prompt from the current snapshot.
pub async fn get_prompt(
    State(state): State<AppState>,
    Query(query): Query<PromptQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let context = match query.context.as_deref() {
        Some(raw) => raw
            .parse::<PromptContext>()
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        None => PromptContext::General,
    };

    let view = state.store.snapshot();
    Ok(Json(json!({
        "context": context.label(),
        "prompt": build_prompt(context, &query.question, &view),
    })))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "agri-hub",
        "version": env!("CARGO_PKG_VERSION"),
        "websocket_clients": websocket::connected_client_count(&state).await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Plain index listing the API.
pub async fn default_index() -> Html<&'static str> {
    Html(DEFAULT_INDEX_HTML)
}

const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>agri_hub</title>
</head>
<body>
    <h1>Smart Agriculture Sensor Hub</h1>
    <ul>
        <li><a href="/api/snapshot">/api/snapshot</a> - current values and histories</li>
        <li><a href="/api/dashboard">/api/dashboard</a> - rolling chart series</li>
        <li><a href="/api/prompt?context=water">/api/prompt</a> - assistant prompt</li>
        <li><a href="/api/health">/api/health</a> - service health</li>
        <li><code>/ws</code> - live snapshot stream</li>
    </ul>
</body>
</html>
"#;
