// handlers/public/health.rs - GET / and GET /health

use axum::{extract::State, http::Uri, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - Service description and endpoint index
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Healthcare API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/register/, /api/auth/login/, /api/auth/token/refresh/ (public)",
                "account": "/api/auth/whoami/, /api/auth/user/ (protected)",
                "patients": "/api/patients/[:id/[doctors/]] (protected)",
                "doctors": "/api/doctors/[:id/] (protected)",
                "mappings": "/api/mappings/[:id/] (protected)",
            }
        }
    }))
}

/// GET /health - Liveness plus a round trip to the record store
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.store.ping().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("database unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}

/// Fallback for unrouted paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
