// ABOUTME: Activity audit log database operations
// ABOUTME: Best-effort appends, one row per event with a fresh uuid id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::errors::{AppError, AppResult};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Activity audit log manager
pub struct ActivityLog {
    pool: SqlitePool,
}

impl ActivityLog {
    /// Create a new activity log
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an activity event
    ///
    /// Every call appends a new row under a fresh id, so repeated activity
    /// on the same day accumulates. `INSERT OR IGNORE` only makes a replay
    /// of an already-stored id a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn record(
        &self,
        user_id: &str,
        activity_type: &str,
        data_json: Option<&str>,
    ) -> AppResult<()> {
        let now = chrono::Utc::now();

        sqlx::query(
            r"
            INSERT OR IGNORE INTO activity_log (id, user_id, activity_type, occurred_on, data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(activity_type)
        .bind(now.format("%Y-%m-%d").to_string())
        .bind(data_json)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record activity: {e}")))?;

        Ok(())
    }

    /// Count recorded activities for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count_for_user(&self, user_id: &str) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM activity_log WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count activity: {e}")))?;

        Ok(row.get("n"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::database::Database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_log() -> ActivityLog {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = Database::from_pool(pool.clone()).await.unwrap();
        ActivityLog::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_same_day_events_each_append_a_row() {
        let log = test_log().await;

        log.record("u1", "chat_interaction", None).await.unwrap();
        log.record("u1", "chat_interaction", None).await.unwrap();

        assert_eq!(log.count_for_user("u1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_counts_are_scoped_per_user() {
        let log = test_log().await;

        log.record("u1", "chat_interaction", Some(r#"{"day":1}"#))
            .await
            .unwrap();
        log.record("u2", "chat_interaction", None).await.unwrap();

        assert_eq!(log.count_for_user("u1").await.unwrap(), 1);
        assert_eq!(log.count_for_user("u2").await.unwrap(), 1);
        assert_eq!(log.count_for_user("u3").await.unwrap(), 0);
    }
}
