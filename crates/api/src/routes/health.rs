//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: StoreHealth,
    pub external_services: ExternalServicesHealth,
}

/// Store health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreHealth {
    pub backend: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Which collaborators are backed by a real service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExternalServicesHealth {
    pub generator: String,
    pub generator_configured: bool,
    pub push_enabled: bool,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Returns 503 with the same body when the store cannot be reached.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let connected = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(backend = state.store.backend(), error = %e, "Store ping failed");
            false
        }
    };
    let latency_ms = start.elapsed().as_millis() as u64;

    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: StoreHealth {
            backend: state.store.backend().to_string(),
            connected,
            latency_ms: connected.then_some(latency_ms),
        },
        external_services: ExternalServicesHealth {
            generator: state.generator.name().to_string(),
            generator_configured: state.generator.is_configured(),
            push_enabled: state.push.is_enabled(),
        },
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic (store reachable).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if state.store.ping().await.is_ok() {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            store: StoreHealth {
                backend: "memory".to_string(),
                connected: true,
                latency_ms: Some(0),
            },
            external_services: ExternalServicesHealth {
                generator: "placeholder".to_string(),
                generator_configured: false,
                push_enabled: false,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["store"]["backend"], "memory");
        assert_eq!(json["external_services"]["generator_configured"], false);
    }

    #[test]
    fn test_unreachable_store_has_no_latency() {
        let health = StoreHealth {
            backend: "postgres".to_string(),
            connected: false,
            latency_ms: None,
        };
        let json = serde_json::to_value(&health).unwrap();
        assert!(json["latency_ms"].is_null());
    }
}
