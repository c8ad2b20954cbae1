// ABOUTME: Daily curriculum prompt database operations
// ABOUTME: Versioned prompt lookup, delivery suppression, and completion progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::errors::{AppError, AppResult};
use crate::models::DailyPrompt;
use sqlx::{Row, SqlitePool};
use tracing::warn;

/// Curriculum prompt database operations manager
pub struct PromptManager {
    pool: SqlitePool,
}

impl PromptManager {
    /// Create a new prompt manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the prompt for a journey day
    ///
    /// When multiple active versions exist for the day, the highest version
    /// wins. A missing or unparseable list column (`fill_in_blanks`,
    /// `follow_up_questions`) becomes an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn daily_prompt_for(&self, day: u32) -> AppResult<Option<DailyPrompt>> {
        let row = sqlx::query(
            r"
            SELECT day_number, version, title, body, fill_in_blanks, follow_up_questions
            FROM daily_prompts
            WHERE day_number = $1 AND is_active = 1
            ORDER BY version DESC
            LIMIT 1
            ",
        )
        .bind(i64::from(day))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch daily prompt: {e}")))?;

        Ok(row.map(|r| DailyPrompt {
            day_number: u32::try_from(r.get::<i64, _>("day_number").max(1)).unwrap_or(1),
            title: r.get("title"),
            body: r.get("body"),
            fill_in_blanks: parse_list_column(r.get("fill_in_blanks"), "fill_in_blanks", day),
            follow_up_questions: parse_list_column(
                r.get("follow_up_questions"),
                "follow_up_questions",
                day,
            ),
            version: r.get("version"),
        }))
    }

    /// Check whether the prompt for (user, day) was already delivered today
    ///
    /// `today` is the calendar date string `YYYY-MM-DD`; deliveries recorded
    /// on earlier dates do not suppress.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delivered_today(&self, user_id: &str, day: u32, today: &str) -> AppResult<bool> {
        let row = sqlx::query(
            r"
            SELECT 1 AS present
            FROM prompt_deliveries
            WHERE user_id = $1 AND day_number = $2 AND delivered_on = $3
            ",
        )
        .bind(user_id)
        .bind(i64::from(day))
        .bind(today)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check delivery: {e}")))?;

        Ok(row.is_some())
    }

    /// Record that the prompt for (user, day) was delivered on a date
    ///
    /// Idempotent: a repeat delivery on the same date is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn record_delivery(&self, user_id: &str, day: u32, date: &str) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT OR IGNORE INTO prompt_deliveries (user_id, day_number, delivered_on, delivered_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user_id)
        .bind(i64::from(day))
        .bind(date)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record delivery: {e}")))?;

        Ok(())
    }

    /// Insert a curriculum prompt row (seeding and tests)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_prompt(
        &self,
        day: u32,
        version: i64,
        title: &str,
        body: &str,
        fill_in_blanks: Option<&[String]>,
        follow_up_questions: Option<&[String]>,
        is_active: bool,
    ) -> AppResult<()> {
        let blanks_json = fill_in_blanks
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AppError::internal(format!("Failed to encode fill_in_blanks: {e}")))?;
        let questions_json = follow_up_questions
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| {
                AppError::internal(format!("Failed to encode follow_up_questions: {e}"))
            })?;

        sqlx::query(
            r"
            INSERT INTO daily_prompts (day_number, version, title, body, fill_in_blanks, follow_up_questions, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(i64::from(day))
        .bind(version)
        .bind(title)
        .bind(body)
        .bind(blanks_json)
        .bind(questions_json)
        .bind(i64::from(is_active))
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert prompt: {e}")))?;

        Ok(())
    }

    /// Upsert the user's completion record for a day
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn record_completion(
        &self,
        user_id: &str,
        day: u32,
        version: i64,
        responses_json: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO prompt_progress (user_id, day_number, version, responses, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, day_number) DO UPDATE SET
                version = excluded.version,
                responses = excluded.responses,
                completed_at = excluded.completed_at
            ",
        )
        .bind(user_id)
        .bind(i64::from(day))
        .bind(version)
        .bind(responses_json)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record completion: {e}")))?;

        Ok(())
    }

    /// Count completed days for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn completed_days(&self, user_id: &str) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM prompt_progress WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count completions: {e}")))?;

        Ok(row.get("n"))
    }
}

/// Decode a JSON string-list column, tolerating NULL and malformed content
fn parse_list_column(raw: Option<String>, column: &str, day: u32) -> Vec<String> {
    raw.as_deref()
        .map(|json| {
            serde_json::from_str(json).unwrap_or_else(|e| {
                warn!("Discarding malformed {column} for day {day}: {e}");
                Vec::new()
            })
        })
        .unwrap_or_default()
}
