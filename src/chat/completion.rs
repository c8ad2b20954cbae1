// ABOUTME: Completion client stage - wraps the LLM provider with coaching semantics
// ABOUTME: Failures and empty completions degrade to fixed fallback replies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use super::outcome::StageOutcome;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use std::sync::Arc;
use tracing::warn;

/// Reply used when the completion call fails outright
pub const TECHNICAL_DIFFICULTIES_REPLY: &str = "I'm experiencing some technical difficulties, but I'm still here to help with your leadership journey. What would you like to discuss today?";

/// Reply used when the provider succeeds but returns empty content
pub const EMPTY_COMPLETION_REPLY: &str = "I'm here to support your leadership development. What specific challenge would you like to work on today?";

/// Fixed user turn sent alongside the assembled system prompt
const COACHING_ASK: &str = "Please provide your leadership coaching response.";

/// Completion stage of the chat pipeline
///
/// The assembled coaching prompt goes in as the system turn with a fixed
/// short user turn, so the provider treats the entire context block as
/// instructions rather than user content.
pub struct CompletionClient {
    provider: Arc<dyn LlmProvider>,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    /// Create a completion client
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            provider,
            max_tokens,
            temperature,
        }
    }

    /// Get a coaching reply for the assembled prompt
    ///
    /// Never errors: transport or parse failures degrade to
    /// [`TECHNICAL_DIFFICULTIES_REPLY`], an empty completion degrades to
    /// [`EMPTY_COMPLETION_REPLY`].
    pub async fn coaching_reply(&self, assembled_prompt: &str) -> StageOutcome<String> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(assembled_prompt),
            ChatMessage::user(COACHING_ASK),
        ])
        .with_max_tokens(self.max_tokens)
        .with_temperature(self.temperature);

        match self.provider.complete(&request).await {
            Ok(response) if response.content.trim().is_empty() => {
                warn!("Completion provider returned empty content");
                StageOutcome::degraded(
                    EMPTY_COMPLETION_REPLY.to_owned(),
                    "completion returned empty content",
                )
            }
            Ok(response) => StageOutcome::Ok(response.content),
            Err(e) => {
                warn!("Completion request failed: {e}");
                StageOutcome::degraded(
                    TECHNICAL_DIFFICULTIES_REPLY.to_owned(),
                    format!("completion failed: {e}"),
                )
            }
        }
    }
}
