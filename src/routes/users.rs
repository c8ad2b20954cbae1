// ABOUTME: User profile route handlers
// ABOUTME: Profile lookup, upsert, and monotonic journey-day progress updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::database::users::UserManager;
use crate::errors::{AppError, AppResult};
use crate::models::UserContext;
use crate::server::ServerResources;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// User view returned by `GET /api/user/:user_id`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User id
    pub id: String,
    /// Login email, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Authorization role
    pub role: String,
    /// Coaching context assembled from the profile
    pub context: UserContext,
}

/// Upsert request body for `POST /api/user`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserRequest {
    /// Stable user id
    pub user_id: String,
    /// Login email
    #[serde(default)]
    pub email: Option<String>,
    /// First name shown in coaching prompts
    #[serde(default)]
    pub first_name: Option<String>,
    /// Business name shown in coaching prompts
    #[serde(default)]
    pub business_name: Option<String>,
    /// Journey day override; a fresh profile defaults to day 1
    #[serde(default)]
    pub current_day: Option<u32>,
}

/// Progress request body for `POST /api/user/:user_id/progress`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    /// Target journey day
    pub current_day: u32,
}

/// Progress response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    /// The day stored after the update
    pub current_day: u32,
}

/// `GET /api/user/:user_id` - fetch a user with its coaching context
///
/// # Errors
///
/// Returns `ResourceNotFound` (404) for an unknown user
pub async fn get_user(
    State(resources): State<Arc<ServerResources>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let users = UserManager::new(resources.database.pool().clone());

    let Some(record) = users.get_user(&user_id).await? else {
        return Err(AppError::not_found(format!("User {user_id}")));
    };

    Ok(Json(UserResponse {
        id: record.id,
        email: record.email,
        display_name: record.display_name,
        role: record.role,
        context: record.context,
    }))
}

/// `POST /api/user` - create or update a user and its profile
///
/// # Errors
///
/// Returns `InvalidInput` (400) for an empty user id, or a database error
/// when the upsert fails
pub async fn upsert_user(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<UpsertUserRequest>,
) -> AppResult<Json<UserResponse>> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::invalid_input("userId is required"));
    }

    let users = UserManager::new(resources.database.pool().clone());
    users
        .upsert_user(
            &request.user_id,
            request.email.as_deref(),
            request.first_name.as_deref(),
            request.business_name.as_deref(),
            request.current_day,
        )
        .await?;

    info!(user_id = %request.user_id, "User upserted");

    let Some(record) = users.get_user(&request.user_id).await? else {
        return Err(AppError::internal("Upserted user missing on re-read"));
    };

    Ok(Json(UserResponse {
        id: record.id,
        email: record.email,
        display_name: record.display_name,
        role: record.role,
        context: record.context,
    }))
}

/// `POST /api/user/:user_id/progress` - move the journey day forward
///
/// The day is monotonic: a target at or behind the stored day leaves the
/// profile untouched and the response echoes the stored value.
///
/// # Errors
///
/// Returns a database error when the update fails
pub async fn update_progress(
    State(resources): State<Arc<ServerResources>>,
    Path(user_id): Path<String>,
    Json(request): Json<ProgressRequest>,
) -> AppResult<Json<ProgressResponse>> {
    let users = UserManager::new(resources.database.pool().clone());
    let current_day = users.advance_day(&user_id, request.current_day).await?;

    Ok(Json(ProgressResponse { current_day }))
}
