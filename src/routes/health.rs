// ABOUTME: Health check route for service monitoring
// ABOUTME: Reports database and cache component status with an overall verdict
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::server::ServerResources;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// Health report returned by `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `healthy` when every component passes, `degraded` otherwise
    pub status: &'static str,
    /// Database component status
    pub database: ComponentStatus,
    /// Cache component status
    pub cache: ComponentStatus,
    /// Report time, RFC 3339
    pub timestamp: String,
}

/// One component's health
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    /// `ok` or `error`
    pub status: &'static str,
    /// Backend identifier (e.g. `sqlite`, `memory`, `redis`)
    pub backend: &'static str,
    /// Failure detail, absent when healthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// `GET /health` - check database and cache connectivity
///
/// Responds 200 when all components are healthy, 503 when any check fails.
pub async fn health(
    State(resources): State<Arc<ServerResources>>,
) -> (StatusCode, Json<HealthReport>) {
    let database = match resources.database.health_check().await {
        Ok(()) => ComponentStatus {
            status: "ok",
            backend: "sqlite",
            detail: None,
        },
        Err(e) => ComponentStatus {
            status: "error",
            backend: "sqlite",
            detail: Some(e.to_string()),
        },
    };

    let cache = match resources.cache.health_check().await {
        Ok(()) => ComponentStatus {
            status: "ok",
            backend: resources.cache.backend_name(),
            detail: None,
        },
        Err(e) => ComponentStatus {
            status: "error",
            backend: resources.cache.backend_name(),
            detail: Some(e.to_string()),
        },
    };

    let healthy = database.status == "ok" && cache.status == "ok";
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let report = HealthReport {
        status: if healthy { "healthy" } else { "degraded" },
        database,
        cache,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (code, Json(report))
}
