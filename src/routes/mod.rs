// ABOUTME: Route module organization for the Summit Coach HTTP API
// ABOUTME: Centralized router assembly with trace and CORS layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! HTTP routes
//!
//! Routes are organized by domain; each module contains thin handlers that
//! delegate to the pipeline and database managers. [`router`] assembles the
//! full application router with tracing and CORS layers.

/// Login route over the credential store
pub mod auth;
/// Chat turn and metrics routes
pub mod chat;
/// Daily curriculum routes
pub mod curriculum;
/// Health check route
pub mod health;
/// User profile routes
pub mod users;

use crate::server::ServerResources;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/chat", post(chat::chat_turn))
        .route("/api/chat/metrics/:user_id", get(chat::metrics))
        .route("/api/curriculum/today/:user_id", get(curriculum::today))
        .route("/api/curriculum/complete", post(curriculum::complete))
        .route("/api/user/:user_id", get(users::get_user))
        .route("/api/user", post(users::upsert_user))
        .route("/api/user/:user_id/progress", post(users::update_progress))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(resources)
}
