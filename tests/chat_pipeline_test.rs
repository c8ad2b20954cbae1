// ABOUTME: End-to-end tests for the chat turn pipeline
// ABOUTME: Covers persistence, degradation fallbacks, and prompt assembly inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{test_resources, MockLlm, MockSearch};
use std::sync::Arc;
use summit_coach::chat::{ChatTurnRequest, TECHNICAL_DIFFICULTIES_REPLY};
use summit_coach::database::activity::ActivityLog;
use summit_coach::database::conversations::ConversationManager;
use summit_coach::database::prompts::PromptManager;
use summit_coach::database::users::UserManager;

fn turn(message: &str, user_id: &str, conversation_id: Option<&str>) -> ChatTurnRequest {
    ChatTurnRequest {
        message: message.to_owned(),
        conversation_id: conversation_id.map(str::to_owned),
        user_id: Some(user_id.to_owned()),
        user_name: None,
        business_name: None,
        current_day: None,
    }
}

#[tokio::test]
async fn test_happy_path_persists_turn_and_reports_progress() {
    let llm = Arc::new(MockLlm::replying("Start by delegating one recurring task."));
    let search = Arc::new(MockSearch::with_results(&["Delegation frees leaders up."]));
    let resources = test_resources(llm.clone(), Some(search)).await;

    let response = resources
        .pipeline
        .handle(turn("How do I delegate more?", "u1", None))
        .await;

    assert_eq!(response.response, "Start by delegating one recurring task.");
    assert_eq!(response.current_day, 1);
    assert_eq!(
        response.user_progress.as_deref(),
        Some("Day 1 of 180 - Leadership Development Journey")
    );
    assert!(!response.conversation_id.is_empty());
    assert_eq!(llm.calls(), 1);

    let conversations = ConversationManager::new(resources.database.pool().clone());
    let stored = conversations
        .get_conversation(&response.conversation_id, "u1")
        .await
        .unwrap()
        .expect("conversation persisted");
    assert_eq!(stored.message_count, 2);
    assert!(stored.title.starts_with("Leadership Chat - "));

    let messages = conversations
        .get_recent_messages(&response.conversation_id, "u1", 10)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, "user");
    assert_eq!(messages[0].content, "How do I delegate more?");
    assert_eq!(messages[1].sender, "assistant");
}

#[tokio::test]
async fn test_completion_failure_degrades_but_still_persists() {
    let llm = Arc::new(MockLlm::failing());
    let resources = test_resources(llm, None).await;

    let response = resources
        .pipeline
        .handle(turn("Help me with hiring", "u1", None))
        .await;

    assert_eq!(response.response, TECHNICAL_DIFFICULTIES_REPLY);
    assert_eq!(response.current_day, 1);

    // The degraded reply is a real turn and still lands in history
    let conversations = ConversationManager::new(resources.database.pool().clone());
    let stored = conversations
        .get_conversation(&response.conversation_id, "u1")
        .await
        .unwrap()
        .expect("conversation persisted");
    assert_eq!(stored.message_count, 2);
}

#[tokio::test]
async fn test_repeat_turns_accumulate_in_one_conversation() {
    let llm = Arc::new(MockLlm::replying("Noted."));
    let resources = test_resources(llm, None).await;

    let first = resources.pipeline.handle(turn("one", "u1", None)).await;
    let second = resources
        .pipeline
        .handle(turn("two", "u1", Some(&first.conversation_id)))
        .await;
    let third = resources
        .pipeline
        .handle(turn("three", "u1", Some(&first.conversation_id)))
        .await;

    assert_eq!(second.conversation_id, first.conversation_id);
    assert_eq!(third.conversation_id, first.conversation_id);

    let conversations = ConversationManager::new(resources.database.pool().clone());
    let stored = conversations
        .get_conversation(&first.conversation_id, "u1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.message_count, 6);

    // Every turn leaves its own audit event, same calendar day included
    let activity = ActivityLog::new(resources.database.pool().clone());
    assert_eq!(activity.count_for_user("u1").await.unwrap(), 3);
}

#[tokio::test]
async fn test_missing_user_id_defaults_to_anonymous() {
    let llm = Arc::new(MockLlm::replying("Hello."));
    let resources = test_resources(llm, None).await;

    let response = resources
        .pipeline
        .handle(ChatTurnRequest {
            message: "hi".to_owned(),
            conversation_id: None,
            user_id: None,
            user_name: None,
            business_name: None,
            current_day: None,
        })
        .await;

    let conversations = ConversationManager::new(resources.database.pool().clone());
    let stored = conversations
        .get_conversation(&response.conversation_id, "anonymous")
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_profile_fields_flow_into_the_assembled_prompt() {
    let llm = Arc::new(MockLlm::replying("Sure."));
    let resources = test_resources(llm.clone(), None).await;

    let users = UserManager::new(resources.database.pool().clone());
    users
        .upsert_user("u1", None, Some("Dana"), Some("Summit Gym"), Some(12))
        .await
        .unwrap();

    resources
        .pipeline
        .handle(turn("What should I focus on?", "u1", None))
        .await;

    let prompt = llm.last_system_prompt().expect("completion was called");
    assert!(prompt.contains("Dana"));
    assert!(prompt.contains("Summit Gym"));
    assert!(prompt.contains("Leadership Journey Day: 12 of 180"));
    assert!(prompt.contains("What should I focus on?"));
}

#[tokio::test]
async fn test_name_hints_apply_only_without_a_profile_row() {
    let llm = Arc::new(MockLlm::replying("Sure."));
    let resources = test_resources(llm.clone(), None).await;

    let mut request = turn("hello", "u1", None);
    request.user_name = Some("Riley".to_owned());
    request.business_name = Some("Hinted Co".to_owned());
    resources.pipeline.handle(request).await;
    let prompt = llm.last_system_prompt().unwrap();
    assert!(prompt.contains("Riley"));
    assert!(prompt.contains("Hinted Co"));

    // Once a profile exists, the stored values win over request hints
    let users = UserManager::new(resources.database.pool().clone());
    users
        .upsert_user("u1", None, Some("Dana"), Some("Summit Gym"), None)
        .await
        .unwrap();

    let mut request = turn("hello again", "u1", None);
    request.user_name = Some("Riley".to_owned());
    resources.pipeline.handle(request).await;
    let prompt = llm.last_system_prompt().unwrap();
    assert!(prompt.contains("Dana"));
    assert!(!prompt.contains("Riley"));
}

#[tokio::test]
async fn test_daily_prompt_included_then_suppressed_after_delivery() {
    let llm = Arc::new(MockLlm::replying("Sure."));
    let resources = test_resources(llm, None).await;

    let prompts = PromptManager::new(resources.database.pool().clone());
    let questions = vec!["What would writing it down unlock?".to_owned()];
    prompts
        .insert_prompt(
            1,
            1,
            "Vision",
            "Write your vision down.",
            None,
            Some(&questions),
            true,
        )
        .await
        .unwrap();

    let response = resources.pipeline.handle(turn("hi", "u1", None)).await;
    let prompt = response.daily_prompt.expect("prompt on first contact");
    assert_eq!(prompt.title, "Vision");
    assert_eq!(prompt.follow_up_questions, questions);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    prompts.record_delivery("u1", 1, &today).await.unwrap();

    let response = resources.pipeline.handle(turn("hi again", "u1", None)).await;
    assert!(response.daily_prompt.is_none());
}
