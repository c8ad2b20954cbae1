// ABOUTME: Credential-store authentication with bcrypt verification
// ABOUTME: Maps (identifier, secret) to an authenticated subject and role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Authentication
//!
//! Credentials live in the user table as bcrypt hashes; authentication takes
//! an identifier (user id or email) and a secret and yields the subject and
//! role. Unknown identifiers and wrong secrets produce the same error so the
//! response does not leak which accounts exist.

use crate::database::users::UserManager;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A successfully authenticated principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    /// The authenticated user id
    pub subject: String,
    /// Authorization role
    pub role: String,
}

/// Authenticator over the credential store
pub struct AuthManager {
    users: UserManager,
}

impl AuthManager {
    /// Create an authenticator
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserManager::new(pool),
        }
    }

    /// Authenticate an identifier/secret pair
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for an unknown identifier or wrong secret, and
    /// a database error when the lookup itself fails.
    pub async fn authenticate(&self, identifier: &str, secret: &str) -> AppResult<AuthResult> {
        let Some(credentials) = self.users.find_credentials(identifier).await? else {
            return Err(AppError::auth_invalid("Invalid credentials"));
        };

        let valid = bcrypt::verify(secret, &credentials.password_hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

        if !valid {
            return Err(AppError::auth_invalid("Invalid credentials"));
        }

        Ok(AuthResult {
            subject: credentials.user_id,
            role: credentials.role,
        })
    }

    /// Hash a secret for storage (registration, seeding, tests)
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails
    pub fn hash_secret(secret: &str) -> AppResult<String> {
        bcrypt::hash(secret, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::database::Database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> (AuthManager, UserManager) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = Database::from_pool(pool.clone()).await.unwrap();
        (
            AuthManager::new(db.pool().clone()),
            UserManager::new(pool),
        )
    }

    #[tokio::test]
    async fn test_authenticate_valid_credentials() {
        let (auth, users) = setup().await;

        // Low cost keeps the test fast; production uses DEFAULT_COST
        let hash = bcrypt::hash("open sesame", 4).unwrap();
        let user_id = users
            .create_user_with_credentials("dana@example.com", &hash, Some("Dana"), "member")
            .await
            .unwrap();

        let result = auth
            .authenticate("dana@example.com", "open sesame")
            .await
            .unwrap();
        assert_eq!(result.subject, user_id);
        assert_eq!(result.role, "member");
    }

    #[tokio::test]
    async fn test_wrong_secret_and_unknown_user_fail_alike() {
        let (auth, users) = setup().await;

        let hash = bcrypt::hash("open sesame", 4).unwrap();
        users
            .create_user_with_credentials("dana@example.com", &hash, None, "member")
            .await
            .unwrap();

        let wrong = auth
            .authenticate("dana@example.com", "not the secret")
            .await
            .unwrap_err();
        let unknown = auth
            .authenticate("nobody@example.com", "anything")
            .await
            .unwrap_err();

        assert_eq!(wrong.code, unknown.code);
        assert_eq!(wrong.message, unknown.message);
    }
}
