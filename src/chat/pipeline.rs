// ABOUTME: Chat pipeline orchestrator - runs all stages for one coaching turn
// ABOUTME: Wraps the run in a deadline; every stage degrades instead of failing the turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use super::assembler::build_coaching_prompt;
use super::completion::CompletionClient;
use super::outcome::StageOutcome;
use crate::cache::factory::Cache;
use crate::config::ServerConfig;
use crate::database::activity::ActivityLog;
use crate::database::conversations::ConversationManager;
use crate::database::prompts::PromptManager;
use crate::database::users::UserManager;
use crate::knowledge::{KnowledgeRetriever, KnowledgeSearch};
use crate::llm::LlmProvider;
use crate::models::{DailyPrompt, MessageRecord, UserContext};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Reply returned when the whole turn fails or the deadline expires
pub const CATCH_ALL_REPLY: &str = "I'm experiencing some technical difficulties, but I'm still here to help with your leadership journey. What would you like to discuss?";

/// Activity type recorded for every chat turn
const CHAT_ACTIVITY_TYPE: &str = "chat_interaction";

/// One incoming chat turn
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    /// The user's message
    pub message: String,
    /// Continue an existing conversation when present
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Authenticated subject or client-supplied id; "anonymous" when absent
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name hint used when no profile row exists
    #[serde(default)]
    pub user_name: Option<String>,
    /// Business name hint used when no profile row exists
    #[serde(default)]
    pub business_name: Option<String>,
    /// Client-reported journey day; informational only, the stored profile
    /// is authoritative
    #[serde(default)]
    pub current_day: Option<u32>,
}

/// The response for one chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    /// Coaching reply text
    pub response: String,
    /// Conversation the turn landed in (fresh uuid on persistence failure)
    pub conversation_id: String,
    /// The user's journey day
    pub current_day: u32,
    /// Daily prompt included this turn, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_prompt: Option<DailyPrompt>,
    /// Progress string, e.g. `Day 12 of 180 - Leadership Development Journey`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_progress: Option<String>,
}

impl ChatTurnResponse {
    /// Catch-all fallback: fixed apologetic reply with a fresh conversation id
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            response: CATCH_ALL_REPLY.to_owned(),
            conversation_id: Uuid::new_v4().to_string(),
            current_day: 0,
            daily_prompt: None,
            user_progress: None,
        }
    }
}

/// The chat turn pipeline
pub struct ChatPipeline {
    users: UserManager,
    conversations: ConversationManager,
    prompts: PromptManager,
    activity: ActivityLog,
    knowledge: KnowledgeRetriever,
    completion: CompletionClient,
    history_limit: i64,
    journey_length_days: u32,
    deadline: Duration,
}

impl ChatPipeline {
    /// Assemble the pipeline from its collaborators
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        cache: Option<Cache>,
        search: Option<Arc<dyn KnowledgeSearch>>,
        provider: Arc<dyn LlmProvider>,
        config: &ServerConfig,
    ) -> Self {
        let knowledge = KnowledgeRetriever::new(
            cache,
            search,
            config.knowledge.top_k,
            Duration::from_secs(config.cache.knowledge_ttl_secs),
        );
        let completion =
            CompletionClient::new(provider, config.llm.max_tokens, config.llm.temperature);

        Self {
            users: UserManager::new(pool.clone()),
            conversations: ConversationManager::new(pool.clone()),
            prompts: PromptManager::new(pool.clone()),
            activity: ActivityLog::new(pool),
            knowledge,
            completion,
            history_limit: config.chat.history_limit,
            journey_length_days: config.chat.journey_length_days,
            deadline: Duration::from_secs(config.chat.request_deadline_secs),
        }
    }

    /// Handle one chat turn, bounded by the configured deadline
    ///
    /// Always returns a usable response: a deadline expiry produces the
    /// catch-all fallback with a fresh conversation id.
    pub async fn handle(&self, request: ChatTurnRequest) -> ChatTurnResponse {
        match tokio::time::timeout(self.deadline, self.run(request)).await {
            Ok(response) => response,
            Err(_) => {
                error!("Chat turn exceeded {}s deadline", self.deadline.as_secs());
                ChatTurnResponse::fallback()
            }
        }
    }

    async fn run(&self, request: ChatTurnRequest) -> ChatTurnResponse {
        let user_id = request
            .user_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "anonymous".to_owned());

        let context = self.load_user_context(&user_id, &request).await;
        let context = context.into_value();

        let history = self
            .fetch_history(&user_id, request.conversation_id.as_deref())
            .await
            .into_value();

        let daily_prompt = self
            .resolve_daily_prompt(&user_id, context.current_day)
            .await
            .into_value();

        let knowledge = self.knowledge.retrieve(&request.message).await;
        if let Some(reason) = knowledge.degradation_reason() {
            debug!("Knowledge retrieval degraded: {reason}");
        }
        let knowledge = knowledge.into_value();

        let assembled = build_coaching_prompt(
            &request.message,
            &context,
            &history,
            daily_prompt.as_ref(),
            &knowledge,
            self.journey_length_days,
        );

        let reply = self.completion.coaching_reply(&assembled).await.into_value();

        let conversation_id = self
            .persist_turn(
                &user_id,
                request.conversation_id.as_deref(),
                &request.message,
                &reply,
            )
            .await
            .into_value();

        self.track_activity(&user_id, context.current_day).await;

        ChatTurnResponse {
            response: reply,
            conversation_id,
            current_day: context.current_day,
            daily_prompt,
            user_progress: Some(format!(
                "Day {} of {} - Leadership Development Journey",
                context.current_day, self.journey_length_days
            )),
        }
    }

    /// Load the user's coaching context, falling back to defaults
    ///
    /// Request-supplied name hints only apply when there is no profile row
    /// to speak for the user.
    async fn load_user_context(
        &self,
        user_id: &str,
        request: &ChatTurnRequest,
    ) -> StageOutcome<UserContext> {
        match self.users.get_user_context(user_id).await {
            Ok(Some(context)) => StageOutcome::Ok(context),
            Ok(None) => {
                let mut context = UserContext::default();
                if let Some(name) = request.user_name.clone().filter(|n| !n.is_empty()) {
                    context.first_name = name;
                }
                if let Some(business) = request.business_name.clone().filter(|b| !b.is_empty()) {
                    context.business_name = business;
                }
                StageOutcome::degraded(context, format!("no user row for {user_id}"))
            }
            Err(e) => {
                warn!("User context load failed: {e}");
                StageOutcome::degraded(
                    UserContext::default(),
                    format!("context load failed: {e}"),
                )
            }
        }
    }

    /// Fetch recent history; no conversation id means an empty history
    async fn fetch_history(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
    ) -> StageOutcome<Vec<MessageRecord>> {
        let Some(conversation_id) = conversation_id.filter(|id| !id.is_empty()) else {
            return StageOutcome::Ok(Vec::new());
        };

        match self
            .conversations
            .get_recent_messages(conversation_id, user_id, self.history_limit)
            .await
        {
            Ok(messages) => StageOutcome::Ok(messages),
            Err(e) => {
                warn!("History fetch failed: {e}");
                StageOutcome::degraded(Vec::new(), format!("history fetch failed: {e}"))
            }
        }
    }

    /// Resolve the day's prompt, suppressed when already delivered today
    async fn resolve_daily_prompt(
        &self,
        user_id: &str,
        current_day: u32,
    ) -> StageOutcome<Option<DailyPrompt>> {
        let today = Utc::now().format("%Y-%m-%d").to_string();

        match self
            .prompts
            .delivered_today(user_id, current_day, &today)
            .await
        {
            Ok(true) => return StageOutcome::Ok(None),
            Ok(false) => {}
            Err(e) => {
                warn!("Delivery check failed: {e}");
                return StageOutcome::degraded(None, format!("delivery check failed: {e}"));
            }
        }

        match self.prompts.daily_prompt_for(current_day).await {
            Ok(prompt) => StageOutcome::Ok(prompt),
            Err(e) => {
                warn!("Daily prompt lookup failed: {e}");
                StageOutcome::degraded(None, format!("prompt lookup failed: {e}"))
            }
        }
    }

    /// Persist the turn; failure abandons it and returns a fresh id
    async fn persist_turn(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
        user_text: &str,
        assistant_text: &str,
    ) -> StageOutcome<String> {
        match self
            .conversations
            .record_turn(user_id, conversation_id, user_text, assistant_text)
            .await
        {
            Ok(id) => StageOutcome::Ok(id),
            Err(e) => {
                error!("Turn persistence failed: {e}");
                StageOutcome::degraded(
                    Uuid::new_v4().to_string(),
                    format!("persistence failed: {e}"),
                )
            }
        }
    }

    /// Best-effort activity append; failures are logged and swallowed
    async fn track_activity(&self, user_id: &str, current_day: u32) {
        let data = serde_json::json!({
            "day": current_day,
            "timestamp": Utc::now().to_rfc3339(),
            "type": "leadership_chat",
        });

        if let Err(e) = self
            .activity
            .record(user_id, CHAT_ACTIVITY_TYPE, Some(&data.to_string()))
            .await
        {
            warn!("Activity tracking failed: {e}");
        }
    }
}
