// ABOUTME: Cache abstraction layer with pluggable backends for knowledge snippets
// ABOUTME: Content-digest cache keys, TTL support, in-memory and Redis implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

/// Cache factory selecting a backend from configuration
pub mod factory;
/// In-memory cache implementation
pub mod memory;
/// Redis cache implementation
pub mod redis;

use crate::config::environment::RedisConnectionConfig;
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Namespace prefix applied to every stored key
pub const CACHE_KEY_PREFIX: &str = "summit:cache:";

/// Cache provider trait for pluggable backend implementations
///
/// # Examples
///
/// ```rust,no_run
/// use summit_coach::cache::{CacheConfig, CacheKey, CacheProvider};
/// use summit_coach::cache::memory::InMemoryCache;
/// use std::time::Duration;
/// # async fn example() -> Result<(), summit_coach::errors::AppError> {
///
/// let config = CacheConfig {
///     enable_background_cleanup: false, // Disable for example
///     ..Default::default()
/// };
/// let cache: InMemoryCache = InMemoryCache::new(config).await?;
///
/// let key = CacheKey::knowledge("how do I delegate without losing control");
/// let snippets = vec!["Delegation starts with trust.".to_owned()];
///
/// cache.set(&key, &snippets, Duration::from_secs(3600)).await?;
/// let cached: Option<Vec<String>> = cache.get(&key).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync + Clone {
    /// Create new cache instance with configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Store value in cache with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Retrieve value from cache; `None` on miss or expiry
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>>;

    /// Remove single cache entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Get remaining TTL for key; `None` when absent or expired
    ///
    /// # Errors
    ///
    /// Returns an error if TTL check fails
    async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>>;

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if health check fails
    async fn health_check(&self) -> AppResult<()>;

    /// Clear all cache entries (for testing/admin)
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (for in-memory cache)
    pub max_entries: usize,
    /// Redis connection URL (for Redis cache)
    pub redis_url: Option<String>,
    /// Cleanup interval for expired entries
    pub cleanup_interval: Duration,
    /// Enable background cleanup task (should be false in tests to avoid runtime conflicts)
    pub enable_background_cleanup: bool,
    /// Redis connection and retry configuration
    pub redis_connection: RedisConnectionConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            redis_url: None,
            cleanup_interval: Duration::from_secs(300),
            enable_background_cleanup: true,
            redis_connection: RedisConnectionConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Build cache configuration from server settings
    #[must_use]
    pub fn from_settings(settings: &crate::config::CacheSettings) -> Self {
        Self {
            max_entries: settings.max_entries,
            redis_url: settings.redis_url.clone(),
            cleanup_interval: Duration::from_secs(settings.cleanup_interval_secs),
            enable_background_cleanup: settings.enable_background_cleanup,
            redis_connection: settings.redis_connection.clone(),
        }
    }
}

/// Structured cache key
///
/// Keys are content-based: the knowledge key embeds a SHA-256 digest of the
/// raw query text, so equal queries map to the same entry on every host and
/// across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Specific resource being cached
    pub resource: CacheResource,
}

impl CacheKey {
    /// Key for knowledge snippets retrieved for a query
    #[must_use]
    pub fn knowledge(query: &str) -> Self {
        let digest = hex::encode(Sha256::digest(query.as_bytes()));
        Self {
            resource: CacheResource::Knowledge { digest },
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)
    }
}

/// Cache resource types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheResource {
    /// Knowledge snippets keyed by query digest (1h TTL)
    Knowledge {
        /// SHA-256 hex digest of the query text
        digest: String,
    },
}

impl fmt::Display for CacheResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Knowledge { digest } => write!(f, "knowledge:{digest}"),
        }
    }
}
