use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use telemetry_record::{DEFAULT_RECORD_PATH, SharedRecord, env::read_env};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod types;

use crate::handlers::{AppState, healthz, latest_reading};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub record_path: PathBuf,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            record_path: PathBuf::from(read_env("SENSOR_RECORD_PATH", DEFAULT_RECORD_PATH)),
        }
    }
}

pub fn build_router(config: ServiceConfig) -> Router {
    let state = Arc::new(AppState {
        record: SharedRecord::new(config.record_path),
    });
    Router::new()
        .route("/", get(latest_reading))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http",
                    %request_id,
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
