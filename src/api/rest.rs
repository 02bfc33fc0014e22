// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// JSON endpoints live under `/api/v1/`; `/` serves the plain-text dashboard.
// Every request builds its sections from fresh fetches; nothing is cached.
//
// CORS is configured permissively so a static front-end can read the JSON.
// =============================================================================

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::dashboard::Dashboard;
use crate::render::render_text;

// =============================================================================
// Router construction
// =============================================================================

/// Build the API router with CORS middleware and the shared dashboard.
pub fn router(dashboard: Arc<Dashboard>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(text_dashboard))
        .route("/api/v1/health", get(health))
        .route("/api/v1/overview", get(overview))
        .route("/api/v1/sentiment", get(sentiment))
        .route("/api/v1/technical", get(technical_default))
        .route("/api/v1/technical/:symbol", get(technical))
        .route("/api/v1/dashboard", get(full_dashboard))
        .layer(cors)
        .with_state(dashboard)
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain in-flight
/// requests.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("API server failed")
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Sections
// =============================================================================

async fn overview(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    Json(dashboard.overview().await)
}

async fn sentiment(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    Json(dashboard.sentiment())
}

async fn technical_default(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    let symbol = dashboard.config().chart_symbol.clone();
    Json(dashboard.technical(&symbol).await)
}

async fn technical(
    State(dashboard): State<Arc<Dashboard>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.trim().to_uppercase();
    info!(symbol = %symbol, "technical section requested");
    Json(dashboard.technical(&symbol).await)
}

async fn full_dashboard(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    Json(dashboard.snapshot().await)
}

async fn text_dashboard(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    render_text(&dashboard.snapshot().await)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::alphavantage::AlphaVantageClient;
    use crate::runtime_config::{ApiCredential, RuntimeConfig};
    use crate::sentiment::FinancialLexicon;

    fn offline_router() -> Router {
        let config = RuntimeConfig::default();
        let client = AlphaVantageClient::new(&config, ApiCredential::default()).unwrap();
        router(Arc::new(Dashboard::new(
            config,
            client,
            Box::new(FinancialLexicon::new()),
        )))
    }

    async fn get_body(uri: &str) -> (StatusCode, Vec<u8>) {
        let resp = offline_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json(uri: &str) -> serde_json::Value {
        let (status, body) = get_body(uri).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let v = get_json("/api/v1/health").await;
        assert_eq!(v["status"], "ok");
    }

    #[tokio::test]
    async fn sentiment_lists_all_headlines() {
        let v = get_json("/api/v1/sentiment").await;
        let rows = v.as_array().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0]["sentiment"], "Bullish");
        assert!(rows[0]["score"].is_number());
    }

    #[tokio::test]
    async fn overview_reports_missing_credential() {
        let v = get_json("/api/v1/overview").await;
        let rows = v.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2]["ticker"], "QQQ");
        assert!(rows[2]["quote"].is_null());
        assert_eq!(rows[2]["absent_reason"], "missing_credential");
    }

    #[tokio::test]
    async fn technical_without_data_is_unavailable() {
        let v = get_json("/api/v1/technical/qqq").await;
        assert_eq!(v["status"], "unavailable");
        assert_eq!(v["symbol"], "QQQ");

        let v = get_json("/api/v1/technical").await;
        assert_eq!(v["symbol"], "QQQ");
    }

    #[tokio::test]
    async fn dashboard_has_every_section() {
        let v = get_json("/api/v1/dashboard").await;
        assert!(v["generated_at"].is_string());
        assert_eq!(v["overview"].as_array().unwrap().len(), 4);
        assert_eq!(v["sentiment"].as_array().unwrap().len(), 5);
        assert_eq!(v["technical"]["status"], "unavailable");
    }

    #[tokio::test]
    async fn serve_returns_once_shutdown_fires() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, offline_router(), async move {
            let _ = stop_rx.await;
        }));

        let resp = reqwest::get(format!("http://{addr}/api/v1/health")).await.unwrap();
        assert!(resp.status().is_success());

        stop_tx.send(()).unwrap();
        let finished = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .expect("server did not stop");
        assert!(finished.unwrap().is_ok());
    }

    #[tokio::test]
    async fn root_serves_text() {
        let (status, body) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("== Market Overview =="));
        assert!(text.contains("WARNING: Unable to fetch QQQ data."));
    }
}
