// ABOUTME: Chat route handlers - one coaching turn and per-user usage metrics
// ABOUTME: The turn handler always answers 200 with a usable coaching response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::chat::{ChatTurnRequest, ChatTurnResponse};
use crate::database::conversations::ConversationManager;
use crate::errors::AppResult;
use crate::models::ChatMetrics;
use crate::server::ServerResources;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use tracing::info;

/// `POST /api/chat` - run one coaching turn
///
/// Never fails the request: the pipeline degrades stage by stage and the
/// deadline path yields the catch-all reply, so clients always get 200 with
/// a response body they can render.
pub async fn chat_turn(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<ChatTurnRequest>,
) -> Json<ChatTurnResponse> {
    info!(
        user_id = request.user_id.as_deref().unwrap_or("anonymous"),
        "Chat turn received"
    );
    Json(resources.pipeline.handle(request).await)
}

/// `GET /api/chat/metrics/:user_id` - aggregate chat usage for a user
///
/// # Errors
///
/// Returns a database error when the aggregation query fails
pub async fn metrics(
    State(resources): State<Arc<ServerResources>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ChatMetrics>> {
    let manager = ConversationManager::new(resources.database.pool().clone());
    Ok(Json(manager.metrics(&user_id).await?))
}
