//! # Health and Stats Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{debug, warn};

use crate::messaging::QueueStats;
use crate::relay::RelayStatsSnapshot;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub provider: String,
    pub queue_name: String,
    pub relay: RelayStatsSnapshot,
    /// Absent when the broker cannot report on the queue
    pub queue: Option<QueueStats>,
}

/// Health check: GET /health
///
/// 200 while the broker connection is usable, 503 otherwise.
pub async fn basic_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let broker = state.relay.broker();
    let (status_code, status) = match broker.health_check().await {
        Ok(true) => (StatusCode::OK, "healthy"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        Err(e) => {
            warn!(error = %e, "Broker health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            provider: broker.provider_name().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

/// Relay and queue counters: GET /stats
pub async fn relay_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let relay = &state.relay;
    let queue = match relay.broker().queue_stats(relay.queue_name()).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            debug!(error = %e, "Queue stats unavailable");
            None
        }
    };

    Json(StatsResponse {
        provider: relay.broker().provider_name().to_string(),
        queue_name: relay.queue_name().to_string(),
        relay: relay.stats(),
        queue,
    })
}
