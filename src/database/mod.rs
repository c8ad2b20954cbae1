// ABOUTME: Database layer - SQLite pool wrapper, schema bootstrap, and per-domain managers
// ABOUTME: Managers own a pool clone and expose typed async operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Database layer
//!
//! A thin [`Database`] wrapper owns the SQLite pool and bootstraps the schema
//! with `CREATE TABLE IF NOT EXISTS` on startup. Per-domain managers
//! ([`UserManager`](users::UserManager),
//! [`ConversationManager`](conversations::ConversationManager),
//! [`PromptManager`](prompts::PromptManager),
//! [`ActivityLog`](activity::ActivityLog)) each hold a pool clone.

pub mod activity;
pub mod conversations;
pub mod prompts;
pub mod users;

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

/// SQLite-backed database with inline schema bootstrap
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and create missing tables
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema bootstrap fails
    pub async fn connect(url: &str, max_connections: u32) -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!("Database ready at {url}");
        Ok(db)
    }

    /// Wrap an existing pool (tests use this with `sqlite::memory:`)
    ///
    /// # Errors
    ///
    /// Returns an error if the schema bootstrap fails
    pub async fn from_pool(pool: SqlitePool) -> AppResult<Self> {
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Access the underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap connectivity probe for health checks
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database health check failed: {e}")))?;
        Ok(())
    }

    async fn migrate(&self) -> AppResult<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE,
                display_name TEXT,
                password_hash TEXT,
                role TEXT NOT NULL DEFAULT 'member',
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY REFERENCES users(id),
                first_name TEXT,
                business_name TEXT,
                current_day INTEGER NOT NULL DEFAULT 1,
                communication_style TEXT NOT NULL DEFAULT 'balanced',
                preferred_response_length TEXT NOT NULL DEFAULT 'medium',
                journey_paused INTEGER NOT NULL DEFAULT 0,
                timezone TEXT NOT NULL DEFAULT 'America/New_York',
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                message_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_message_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS conversation_messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL REFERENCES conversations(id),
                sender TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_messages_conversation
                ON conversation_messages(conversation_id, created_at)
            ",
            r"
            CREATE TABLE IF NOT EXISTS daily_prompts (
                day_number INTEGER NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                fill_in_blanks TEXT,
                follow_up_questions TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                PRIMARY KEY (day_number, version)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS prompt_deliveries (
                user_id TEXT NOT NULL,
                day_number INTEGER NOT NULL,
                delivered_on TEXT NOT NULL,
                delivered_at TEXT NOT NULL,
                PRIMARY KEY (user_id, day_number, delivered_on)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS prompt_progress (
                user_id TEXT NOT NULL,
                day_number INTEGER NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                responses TEXT,
                completed_at TEXT NOT NULL,
                PRIMARY KEY (user_id, day_number)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS activity_log (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                activity_type TEXT NOT NULL,
                occurred_on TEXT NOT NULL,
                data TEXT,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_activity_user_date
                ON activity_log(user_id, occurred_on)
            ",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Schema bootstrap failed: {e}")))?;
        }

        Ok(())
    }
}
