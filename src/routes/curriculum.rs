// ABOUTME: Daily curriculum route handlers
// ABOUTME: Serves the day's prompt formatted by communication style and records completions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::database::prompts::PromptManager;
use crate::database::users::UserManager;
use crate::errors::{AppError, AppResult};
use crate::models::CommunicationStyle;
use crate::server::ServerResources;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Prompt served when no curriculum row exists for the user's day
const FALLBACK_PROMPT_TITLE: &str = "System Check";
const FALLBACK_PROMPT_BODY: &str = "Today, identify one system in your business that needs improvement. Write it down and the first step to fix it.";

/// The day's prompt, formatted for the user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    /// The user's journey day
    pub day_number: u32,
    /// Short title
    pub title: String,
    /// Prompt text rendered for the user's communication style
    pub prompt: String,
    /// Fill-in-the-blank fragments, absent for the fallback prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_in_blanks: Option<Vec<String>>,
    /// Content revision, absent for the fallback prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    /// The style the prompt was rendered with
    pub style: String,
}

/// Completion request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// The completing user
    pub user_id: String,
    /// The day being completed
    pub day_number: u32,
    /// Version of the prompt the user saw
    pub version: i64,
    /// Free-form answers keyed by blank
    #[serde(default)]
    pub responses: HashMap<String, String>,
}

/// Completion response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Always true on success
    pub success: bool,
    /// The day the user is on after the completion
    pub next_day: u32,
}

/// Render the prompt body for a communication style
fn format_prompt(style: CommunicationStyle, title: &str, body: &str, day: u32) -> String {
    match style {
        CommunicationStyle::Concise => format!("Day {day}: {body}"),
        CommunicationStyle::Balanced => {
            format!("Day {day} - {title}\n\n{body}\n\nTake a moment to reflect.")
        }
        CommunicationStyle::Detailed => format!(
            "Good morning! Welcome to Day {day} of your leadership journey.\n\n**{title}**\n\n{body}\n\nThis exercise will help you grow as a leader. Take your time, be honest with yourself, and remember - progress over perfection. You've got this!"
        ),
    }
}

/// `GET /api/curriculum/today/:user_id` - the day's prompt, style-formatted
///
/// A day with no curriculum row gets the static fallback prompt rather than
/// an empty response.
///
/// # Errors
///
/// Returns `ResourceNotFound` (404) for an unknown user, or a database error
/// when a query fails
pub async fn today(
    State(resources): State<Arc<ServerResources>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<TodayResponse>> {
    let users = UserManager::new(resources.database.pool().clone());
    let prompts = PromptManager::new(resources.database.pool().clone());

    let Some(context) = users.get_user_context(&user_id).await? else {
        return Err(AppError::not_found(format!("User {user_id}")));
    };

    let style = context.communication_style;
    let response = match prompts.daily_prompt_for(context.current_day).await? {
        Some(prompt) => TodayResponse {
            day_number: prompt.day_number,
            prompt: format_prompt(style, &prompt.title, &prompt.body, prompt.day_number),
            title: prompt.title,
            fill_in_blanks: Some(prompt.fill_in_blanks),
            version: Some(prompt.version),
            style: style.as_str().to_owned(),
        },
        None => TodayResponse {
            day_number: context.current_day,
            title: FALLBACK_PROMPT_TITLE.to_owned(),
            prompt: FALLBACK_PROMPT_BODY.to_owned(),
            fill_in_blanks: None,
            version: None,
            style: style.as_str().to_owned(),
        },
    };

    Ok(Json(response))
}

/// `POST /api/curriculum/complete` - record a completion and advance the day
///
/// The day only ever moves forward: completing an earlier day again does not
/// roll the user back.
///
/// # Errors
///
/// Returns a database error when persistence fails
pub async fn complete(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<CompletionRequest>,
) -> AppResult<Json<CompletionResponse>> {
    let users = UserManager::new(resources.database.pool().clone());
    let prompts = PromptManager::new(resources.database.pool().clone());

    let responses_json = serde_json::to_string(&request.responses)
        .map_err(|e| AppError::internal(format!("Failed to encode responses: {e}")))?;

    prompts
        .record_completion(
            &request.user_id,
            request.day_number,
            request.version,
            Some(&responses_json),
        )
        .await?;

    let next_day = users
        .advance_day(&request.user_id, request.day_number + 1)
        .await?;

    info!(
        user_id = %request.user_id,
        day = request.day_number,
        "Curriculum day completed"
    );

    Ok(Json(CompletionResponse {
        success: true,
        next_day,
    }))
}
