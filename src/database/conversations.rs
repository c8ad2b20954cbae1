// ABOUTME: Conversation and message database operations
// ABOUTME: Bounded history fetch, transactional turn persistence, and usage metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::errors::{AppError, AppResult};
use crate::models::{ChatMetrics, ConversationRecord, MessageRecord, MessageSender};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Conversation database operations manager
pub struct ConversationManager {
    pool: SqlitePool,
}

impl ConversationManager {
    /// Create a new conversation manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new conversation for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_conversation(
        &self,
        user_id: &str,
        title: &str,
    ) -> AppResult<ConversationRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO conversations (id, user_id, title, status, message_count, created_at, last_message_at)
            VALUES ($1, $2, $3, 'active', 0, $4, $4)
            ",
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?;

        Ok(ConversationRecord {
            id,
            user_id: user_id.to_owned(),
            title: title.to_owned(),
            status: "active".to_owned(),
            message_count: 0,
            created_at: now,
            last_message_at: now,
        })
    }

    /// Get a conversation by id, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_conversation(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<Option<ConversationRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, status, message_count, created_at, last_message_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?;

        row.map(|r| conversation_from_row(&r)).transpose()
    }

    /// Fetch the most recent messages of a conversation, oldest first
    ///
    /// The query takes the newest `limit` messages; the result is re-sorted
    /// ascending so callers see them in reading order. Ownership is enforced
    /// through the join: a foreign conversation id yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_recent_messages(
        &self,
        conversation_id: &str,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<MessageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT m.id, m.conversation_id, m.sender, m.content, m.created_at
            FROM conversation_messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE m.conversation_id = $1 AND c.user_id = $2
            ORDER BY m.created_at DESC
            LIMIT $3
            ",
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch messages: {e}")))?;

        let mut messages = rows
            .iter()
            .map(message_from_row)
            .collect::<AppResult<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }

    /// Persist one chat turn atomically
    ///
    /// Creates the conversation when `conversation_id` is absent or does not
    /// belong to the user, appends the user and assistant messages, bumps the
    /// message counter by two and the last-activity time, all in a single
    /// transaction. Returns the conversation id the turn landed in.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement in the transaction fails; nothing
    /// is persisted in that case.
    pub async fn record_turn(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
        user_text: &str,
        assistant_text: &str,
    ) -> AppResult<String> {
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let existing = match conversation_id {
            Some(id) => {
                let row = sqlx::query("SELECT id FROM conversations WHERE id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::database(format!("Failed to check conversation: {e}"))
                    })?;
                row.map(|r| r.get::<String, _>("id"))
            }
            None => None,
        };

        let conversation_id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                let title = format!("Leadership Chat - {}", now.format("%Y-%m-%d"));
                sqlx::query(
                    r"
                    INSERT INTO conversations (id, user_id, title, status, message_count, created_at, last_message_at)
                    VALUES ($1, $2, $3, 'active', 0, $4, $4)
                    ",
                )
                .bind(&id)
                .bind(user_id)
                .bind(&title)
                .bind(&now_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?;
                id
            }
        };

        for (sender, content) in [
            (MessageSender::User, user_text),
            (MessageSender::Assistant, assistant_text),
        ] {
            sqlx::query(
                r"
                INSERT INTO conversation_messages (id, conversation_id, sender, content, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&conversation_id)
            .bind(sender.as_str())
            .bind(content)
            .bind(&now_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to append message: {e}")))?;
        }

        sqlx::query(
            r"
            UPDATE conversations
            SET message_count = message_count + 2, last_message_at = $2
            WHERE id = $1
            ",
        )
        .bind(&conversation_id)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update conversation: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit turn: {e}")))?;

        Ok(conversation_id)
    }

    /// Aggregate chat usage for one user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn metrics(&self, user_id: &str) -> AppResult<ChatMetrics> {
        let row = sqlx::query(
            r"
            SELECT COUNT(DISTINCT c.id) AS total_conversations,
                   COUNT(m.id) AS total_messages,
                   COUNT(DISTINCT date(m.created_at)) AS active_days,
                   MAX(m.created_at) AS last_activity
            FROM conversations c
            LEFT JOIN conversation_messages m ON m.conversation_id = c.id
            WHERE c.user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute metrics: {e}")))?;

        let total_conversations: i64 = row.get("total_conversations");
        let total_messages: i64 = row.get("total_messages");
        let active_days: i64 = row.get("active_days");
        let last_activity = row
            .get::<Option<String>, _>("last_activity")
            .map(|ts| parse_timestamp(&ts))
            .transpose()?;

        let average = if total_conversations > 0 {
            total_messages as f64 / total_conversations as f64
        } else {
            0.0
        };

        Ok(ChatMetrics {
            total_conversations,
            total_messages,
            active_days,
            last_activity,
            average_messages_per_conversation: average,
        })
    }
}

fn conversation_from_row(row: &sqlx::sqlite::SqliteRow) -> AppResult<ConversationRecord> {
    Ok(ConversationRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        status: row.get("status"),
        message_count: row.get("message_count"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        last_message_at: parse_timestamp(&row.get::<String, _>("last_message_at"))?,
    })
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> AppResult<MessageRecord> {
    Ok(MessageRecord {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender: row.get("sender"),
        content: row.get("content"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp '{raw}': {e}")))
}
