// ABOUTME: Integration tests for conversation storage and history windowing
// ABOUTME: Covers the bounded newest-first fetch, ownership scoping, and metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::test_database;
use summit_coach::database::conversations::ConversationManager;

/// Insert a message with a controlled timestamp, bypassing record_turn
async fn insert_message(
    pool: &sqlx::SqlitePool,
    conversation_id: &str,
    id: &str,
    sender: &str,
    content: &str,
    minutes_ago: i64,
) {
    let ts = (Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339();
    sqlx::query(
        "INSERT INTO conversation_messages (id, conversation_id, sender, content, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(conversation_id)
    .bind(sender)
    .bind(content)
    .bind(ts)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_recent_messages_returns_newest_ten_oldest_first() {
    let db = test_database().await;
    let manager = ConversationManager::new(db.pool().clone());
    let conversation = manager.create_conversation("u1", "History").await.unwrap();

    // 15 messages, msg-1 the oldest
    for i in 1..=15 {
        insert_message(
            db.pool(),
            &conversation.id,
            &format!("msg-{i}"),
            if i % 2 == 1 { "user" } else { "assistant" },
            &format!("message {i}"),
            30 - i,
        )
        .await;
    }

    let messages = manager
        .get_recent_messages(&conversation.id, "u1", 10)
        .await
        .unwrap();

    assert_eq!(messages.len(), 10);
    // The oldest five are dropped; the window reads in chronological order
    assert_eq!(messages[0].id, "msg-6");
    assert_eq!(messages[9].id, "msg-15");
    for pair in messages.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_foreign_conversation_yields_no_history() {
    let db = test_database().await;
    let manager = ConversationManager::new(db.pool().clone());
    let conversation = manager.create_conversation("u1", "Private").await.unwrap();
    insert_message(db.pool(), &conversation.id, "m1", "user", "secret", 1).await;

    let messages = manager
        .get_recent_messages(&conversation.id, "someone-else", 10)
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_record_turn_reuses_owned_conversation() {
    let db = test_database().await;
    let manager = ConversationManager::new(db.pool().clone());

    let first = manager
        .record_turn("u1", None, "hello", "hi there")
        .await
        .unwrap();
    let second = manager
        .record_turn("u1", Some(&first), "more", "sure")
        .await
        .unwrap();
    assert_eq!(first, second);

    let stored = manager.get_conversation(&first, "u1").await.unwrap().unwrap();
    assert_eq!(stored.message_count, 4);
}

#[tokio::test]
async fn test_record_turn_ignores_conversation_owned_by_another_user() {
    let db = test_database().await;
    let manager = ConversationManager::new(db.pool().clone());

    let theirs = manager
        .record_turn("other", None, "hello", "hi")
        .await
        .unwrap();
    let mine = manager
        .record_turn("u1", Some(&theirs), "hello", "hi")
        .await
        .unwrap();

    // A foreign id starts a fresh conversation instead of appending
    assert_ne!(mine, theirs);
    let original = manager
        .get_conversation(&theirs, "other")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(original.message_count, 2);
}

#[tokio::test]
async fn test_metrics_aggregate_across_conversations() {
    let db = test_database().await;
    let manager = ConversationManager::new(db.pool().clone());

    let first = manager.record_turn("u1", None, "a", "b").await.unwrap();
    manager
        .record_turn("u1", Some(&first), "c", "d")
        .await
        .unwrap();
    manager.record_turn("u1", None, "e", "f").await.unwrap();
    manager.record_turn("other", None, "x", "y").await.unwrap();

    let metrics = manager.metrics("u1").await.unwrap();
    assert_eq!(metrics.total_conversations, 2);
    assert_eq!(metrics.total_messages, 6);
    assert_eq!(metrics.active_days, 1);
    assert!(metrics.last_activity.is_some());
    assert!((metrics.average_messages_per_conversation - 3.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_connect_bootstraps_a_file_backed_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summit.db");
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = summit_coach::database::Database::connect(&url, 1).await.unwrap();
    db.health_check().await.unwrap();
    assert!(path.exists());

    let manager = ConversationManager::new(db.pool().clone());
    let id = manager.record_turn("u1", None, "hello", "hi").await.unwrap();
    assert!(manager.get_conversation(&id, "u1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_metrics_for_unknown_user_are_zero() {
    let db = test_database().await;
    let manager = ConversationManager::new(db.pool().clone());

    let metrics = manager.metrics("nobody").await.unwrap();
    assert_eq!(metrics.total_conversations, 0);
    assert_eq!(metrics.total_messages, 0);
    assert!(metrics.last_activity.is_none());
    assert!(metrics.average_messages_per_conversation.abs() < f64::EPSILON);
}
