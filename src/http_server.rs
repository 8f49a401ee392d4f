//! REST admin surface: `GET /ping` and `PUT /deny/:domain`,
//! grounded on the original's `pkg/controller/rest/handler.go` (a
//! `gin` router with the same two routes). Bound to `AdminBindAddr`,
//! spawned as its own task; never called by the resolver, cache, or
//! either ingress, and a `/metrics` scrape endpoint alongside it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::denylist::Service as DenylistService;
use crate::logger::Logger;
use crate::metrics::Metrics;

#[derive(Clone)]
struct AppState {
    denylist: Arc<DenylistService>,
    metrics: Arc<Metrics>,
    logger: Logger,
}

pub struct HttpServer {
    bind_addr: SocketAddr,
    denylist: Arc<DenylistService>,
    metrics: Arc<Metrics>,
    logger: Logger,
}

impl HttpServer {
    pub fn new(bind_addr: SocketAddr, denylist: Arc<DenylistService>, metrics: Arc<Metrics>, logger: Logger) -> Self {
        Self {
            bind_addr,
            denylist,
            metrics,
            logger,
        }
    }

    pub async fn run(self) -> std::io::Result<()> {
        let state = AppState {
            denylist: self.denylist,
            metrics: self.metrics,
            logger: self.logger.clone(),
        };

        let app = Router::new()
            .route("/ping", get(ping))
            .route("/deny/{domain}", put(add_denied_domain))
            .route("/metrics", get(metrics))
            .with_state(state)
            .layer(CorsLayer::permissive());

        self.logger.info(&format!("admin HTTP server listening on {}", self.bind_addr));
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        axum::serve(listener, app).await
    }
}

async fn ping() -> &'static str {
    "pong"
}

async fn add_denied_domain(State(state): State<AppState>, Path(domain): Path<String>) -> Response {
    if domain.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "missing domain" }))).into_response();
    }
    let added_at_unix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    match state.denylist.add_denied_domain(&domain, added_at_unix) {
        Ok(()) => {
            (StatusCode::OK, Json(json!({ "message": format!("{domain} added to denylist successfully") }))).into_response()
        }
        Err(e) => {
            state.logger.err(&format!("failed to add {domain} to denylist: {e}"));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.export() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
