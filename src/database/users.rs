// ABOUTME: User and profile database operations
// ABOUTME: Context loading with documented defaults, upserts, and monotonic day advancement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::errors::{AppError, AppResult};
use crate::models::{CommunicationStyle, ResponseLength, UserContext};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A user row joined with its profile
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// User id
    pub id: String,
    /// Login email, if set
    pub email: Option<String>,
    /// Display name, if set
    pub display_name: Option<String>,
    /// Authorization role
    pub role: String,
    /// Coaching context assembled from the profile row
    pub context: UserContext,
}

/// Credential columns used by the authenticator
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// User id (the authenticated subject)
    pub user_id: String,
    /// bcrypt hash of the user's secret
    pub password_hash: String,
    /// Authorization role
    pub role: String,
}

/// User database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the coaching context for a user, by id or email
    ///
    /// Missing profile columns fall back to the [`UserContext::default`]
    /// values, so a bare user row still yields a complete context. Returns
    /// `None` when no user row matches at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_user_context(&self, identifier: &str) -> AppResult<Option<UserContext>> {
        let row = sqlx::query(
            r"
            SELECT COALESCE(p.first_name, u.display_name, 'Leader') AS first_name,
                   COALESCE(p.business_name, 'Your Business') AS business_name,
                   COALESCE(p.current_day, 1) AS current_day,
                   COALESCE(p.communication_style, 'balanced') AS communication_style,
                   COALESCE(p.preferred_response_length, 'medium') AS preferred_response_length,
                   COALESCE(p.journey_paused, 0) AS journey_paused,
                   COALESCE(p.timezone, 'America/New_York') AS timezone
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            WHERE u.id = $1 OR u.email = $1
            ",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user context: {e}")))?;

        Ok(row.map(|r| {
            let day: i64 = r.get("current_day");
            UserContext {
                first_name: r.get("first_name"),
                business_name: r.get("business_name"),
                current_day: u32::try_from(day.max(1)).unwrap_or(1),
                communication_style: CommunicationStyle::from_str_or_default(
                    r.get::<String, _>("communication_style").as_str(),
                ),
                preferred_response_length: ResponseLength::from_str_or_default(
                    r.get::<String, _>("preferred_response_length").as_str(),
                ),
                journey_paused: r.get::<i64, _>("journey_paused") != 0,
                timezone: r.get("timezone"),
            }
        }))
    }

    /// Fetch a user row with its profile, by id or email
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_user(&self, identifier: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(
            r"
            SELECT u.id, u.email, u.display_name, u.role
            FROM users u
            WHERE u.id = $1 OR u.email = $1
            ",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user: {e}")))?;

        let Some(r) = row else {
            return Ok(None);
        };

        let id: String = r.get("id");
        let context = self
            .get_user_context(&id)
            .await?
            .unwrap_or_default();

        Ok(Some(UserRecord {
            id,
            email: r.get("email"),
            display_name: r.get("display_name"),
            role: r.get("role"),
            context,
        }))
    }

    /// Create or update a user and its profile
    ///
    /// A fresh profile starts at day 1 unless `current_day` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn upsert_user(
        &self,
        user_id: &str,
        email: Option<&str>,
        first_name: Option<&str>,
        business_name: Option<&str>,
        current_day: Option<u32>,
    ) -> AppResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(excluded.email, users.email),
                display_name = COALESCE(excluded.display_name, users.display_name)
            ",
        )
        .bind(user_id)
        .bind(email)
        .bind(first_name)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert user: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, first_name, business_name, current_day, updated_at)
            VALUES ($1, $2, $3, COALESCE($4, 1), $5)
            ON CONFLICT (user_id) DO UPDATE SET
                first_name = COALESCE(excluded.first_name, user_profiles.first_name),
                business_name = COALESCE(excluded.business_name, user_profiles.business_name),
                current_day = COALESCE($4, user_profiles.current_day),
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(first_name)
        .bind(business_name)
        .bind(current_day.map(i64::from))
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert profile: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit upsert: {e}")))?;

        Ok(())
    }

    /// Register a user with credentials (seeding and tests)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_user_with_credentials(
        &self,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
        role: &str,
    ) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&id)
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .bind(role)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        Ok(id)
    }

    /// Look up credential columns by user id or email
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn find_credentials(
        &self,
        identifier: &str,
    ) -> AppResult<Option<CredentialRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, password_hash, role
            FROM users
            WHERE (id = $1 OR email = $1) AND password_hash IS NOT NULL
            ",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load credentials: {e}")))?;

        Ok(row.map(|r| CredentialRecord {
            user_id: r.get("id"),
            password_hash: r.get("password_hash"),
            role: r.get("role"),
        }))
    }

    /// Advance the user's journey day, only ever forward
    ///
    /// Returns the day stored after the update. A target at or behind the
    /// current day leaves the row untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn advance_day(&self, user_id: &str, to_day: u32) -> AppResult<u32> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            UPDATE user_profiles
            SET current_day = $2, updated_at = $3
            WHERE user_id = $1 AND current_day < $2
            ",
        )
        .bind(user_id)
        .bind(i64::from(to_day))
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to advance day: {e}")))?;

        let row = sqlx::query("SELECT current_day FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to read current day: {e}")))?;

        Ok(row
            .map(|r| u32::try_from(r.get::<i64, _>("current_day").max(1)).unwrap_or(1))
            .unwrap_or(1))
    }
}
