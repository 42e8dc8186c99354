// handlers/public/mod.rs - Public handlers (no identity required)

use axum::response::Json;
use serde_json::{json, Value};

use crate::error::ApiError;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Tenant Gateway",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/* (any authenticated user)",
                "profile": "/api/profile (any authenticated user)",
                "meetings": "/api/meetings[/:id] (tenant scoped)",
                "super_admin": "/api/super-admin/* (SUPER_ADMIN only)",
            }
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

/// Fallback for anything no handler claims. Runs after the gateway, so an
/// unknown tenant path is still refused to callers without access.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
