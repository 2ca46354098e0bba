//! HTTP server for strategy lookups.
//!
//! # Routes
//! - `GET /sampling?service=<name>`: resolved strategy as JSON
//! - `GET /health`: liveness

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::HttpConfig;
use crate::http::response::SamplingStrategyResponse;
use crate::store::SamplingStrategyProvider;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub strategies: Arc<dyn SamplingStrategyProvider>,
}

#[derive(Debug, Deserialize)]
pub struct SamplingQuery {
    service: Option<String>,
}

/// HTTP server exposing the strategy store.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(strategies: Arc<dyn SamplingStrategyProvider>, config: &HttpConfig) -> Self {
        let state = AppState { strategies };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &HttpConfig, state: AppState) -> Router {
        Router::new()
            .route("/sampling", get(sampling_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs))),
            )
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

async fn sampling_handler(
    State(state): State<AppState>,
    Query(query): Query<SamplingQuery>,
) -> Response {
    let Some(service) = query.service.filter(|s| !s.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "'service' parameter must be provided").into_response();
    };

    let strategy = state.strategies.get_strategy(&service);
    Json(SamplingStrategyResponse::from(strategy.as_ref())).into_response()
}

async fn health_handler() -> &'static str {
    "ok"
}
