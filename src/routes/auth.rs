// ABOUTME: Login route over the credential store
// ABOUTME: Exchanges an identifier/secret pair for the authenticated subject and role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::server::ServerResources;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Login request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// User id or email
    pub identifier: String,
    /// The account secret
    pub secret: String,
}

/// `POST /api/auth/login` - authenticate a credential pair
///
/// # Errors
///
/// Returns `AuthInvalid` (401) for an unknown identifier or wrong secret
pub async fn login(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResult>> {
    if request.identifier.trim().is_empty() || request.secret.is_empty() {
        return Err(AppError::invalid_input("Identifier and secret are required"));
    }

    let result = resources
        .auth
        .authenticate(&request.identifier, &request.secret)
        .await?;

    info!(subject = %result.subject, "Login succeeded");
    Ok(Json(result))
}
