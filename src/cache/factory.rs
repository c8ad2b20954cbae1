// ABOUTME: Cache factory for configuration-based backend selection
// ABOUTME: Unified Cache enum dispatching to in-memory or Redis backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use super::{memory::InMemoryCache, redis::RedisCache, CacheConfig, CacheKey, CacheProvider};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unified cache interface over the configured backend
///
/// A `REDIS_URL` in the configuration selects the Redis backend; otherwise
/// the in-process LRU cache is used.
#[derive(Clone)]
pub enum Cache {
    /// In-process LRU cache
    Memory(InMemoryCache),
    /// Shared Redis cache
    Redis(RedisCache),
}

impl Cache {
    /// Create new cache instance based on configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails (for Redis, after the
    /// configured connection retries are exhausted)
    pub async fn new(config: CacheConfig) -> AppResult<Self> {
        if config.redis_url.is_some() {
            tracing::info!("Initializing Redis cache");
            let inner = RedisCache::new(config).await?;
            Ok(Self::Redis(inner))
        } else {
            tracing::info!(
                "Initializing in-memory cache (max entries: {})",
                config.max_entries
            );
            let inner = InMemoryCache::new(config).await?;
            Ok(Self::Memory(inner))
        }
    }

    /// Store value in cache with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    pub async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        match self {
            Self::Memory(inner) => inner.set(key, value, ttl).await,
            Self::Redis(inner) => inner.set(key, value, ttl).await,
        }
    }

    /// Retrieve value from cache
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        match self {
            Self::Memory(inner) => inner.get(key).await,
            Self::Redis(inner) => inner.get(key).await,
        }
    }

    /// Remove single cache entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    pub async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        match self {
            Self::Memory(inner) => inner.invalidate(key).await,
            Self::Redis(inner) => inner.invalidate(key).await,
        }
    }

    /// Get remaining TTL for key
    ///
    /// # Errors
    ///
    /// Returns an error if TTL check fails
    pub async fn ttl(&self, key: &CacheKey) -> AppResult<Option<Duration>> {
        match self {
            Self::Memory(inner) => inner.ttl(key).await,
            Self::Redis(inner) => inner.ttl(key).await,
        }
    }

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if health check fails
    pub async fn health_check(&self) -> AppResult<()> {
        match self {
            Self::Memory(inner) => inner.health_check().await,
            Self::Redis(inner) => inner.health_check().await,
        }
    }

    /// Clear all cache entries
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    pub async fn clear_all(&self) -> AppResult<()> {
        match self {
            Self::Memory(inner) => inner.clear_all().await,
            Self::Redis(inner) => inner.clear_all().await,
        }
    }

    /// Backend name for health reporting
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }
}
