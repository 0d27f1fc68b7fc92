use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use telemetry_record::{RecordError, SharedRecord};

use crate::types::Reading;

pub struct AppState {
    pub record: SharedRecord,
}

pub async fn healthz() -> Json<Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn latest_reading(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Reading>, (StatusCode, String)> {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let record = state.record.clone();
    let loaded = tokio::task::spawn_blocking(move || record.load())
        .await
        .map_err(|e| {
            tracing::error!(%request_id, error = %e, "record read task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "record read failed".into())
        })?;

    match loaded {
        Ok(record) => {
            let reading = Reading::from(record);
            tracing::debug!(
                %request_id,
                temp = reading.temp,
                humidity = reading.humidity,
                co2 = reading.co2,
                "serving reading"
            );
            Ok(Json(reading))
        }
        Err(e @ RecordError::Unavailable { .. }) => {
            tracing::warn!(%request_id, error = %e, "no telemetry record yet");
            Err((StatusCode::SERVICE_UNAVAILABLE, "telemetry record unavailable".into()))
        }
        // Malformed or non-finite.
        Err(e) => {
            tracing::error!(%request_id, error = %e, "telemetry record unreadable");
            Err((StatusCode::SERVICE_UNAVAILABLE, "telemetry record malformed".into()))
        }
    }
}
