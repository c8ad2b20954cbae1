// ABOUTME: Knowledge snippet retrieval - cache, vector search, and static fallback
// ABOUTME: Never raises; degradation always yields usable coaching content
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Knowledge snippet retrieval
//!
//! Retrieval policy, in order: cache lookup by content digest, vector search
//! (top 3) with a best-effort 1-hour cache write, then a static fallback
//! list. Every failure path degrades; this stage never returns an error.

pub mod weaviate;

pub use weaviate::WeaviateSearch;

use crate::cache::factory::Cache;
use crate::cache::CacheKey;
use crate::chat::outcome::StageOutcome;
use crate::errors::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Static coaching content served when search yields nothing
pub const FALLBACK_SNIPPETS: [&str; 5] = [
    "Leadership is about creating a clear vision and helping others achieve it.",
    "Effective leaders focus on developing their team members' strengths.",
    "Building trust through consistent actions is fundamental to leadership.",
    "Great leaders ask powerful questions that help people discover solutions.",
    "Leadership development is a continuous journey of self-improvement and learning.",
];

/// Vector search backend contract
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// Return up to `limit` snippets relevant to the query
    ///
    /// # Errors
    ///
    /// Returns an error if the search service is unreachable or returns a
    /// malformed response
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<String>>;
}

/// Knowledge snippet retriever
///
/// Both the cache and the search backend are optional; with neither
/// configured every retrieval degrades to [`FALLBACK_SNIPPETS`].
pub struct KnowledgeRetriever {
    cache: Option<Cache>,
    search: Option<Arc<dyn KnowledgeSearch>>,
    top_k: usize,
    cache_ttl: Duration,
}

impl KnowledgeRetriever {
    /// Create a retriever
    #[must_use]
    pub fn new(
        cache: Option<Cache>,
        search: Option<Arc<dyn KnowledgeSearch>>,
        top_k: usize,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            search,
            top_k,
            cache_ttl,
        }
    }

    /// Retrieve snippets for a query
    ///
    /// A cache hit short-circuits the search entirely. On a miss, search
    /// results are written back with the configured TTL; a failed write is
    /// logged and otherwise ignored. Empty or failed search degrades to the
    /// static fallback with a reason.
    pub async fn retrieve(&self, query: &str) -> StageOutcome<Vec<String>> {
        let key = CacheKey::knowledge(query);

        if let Some(cache) = &self.cache {
            match cache.get::<Vec<String>>(&key).await {
                Ok(Some(snippets)) if !snippets.is_empty() => {
                    debug!("Knowledge cache hit for {key}");
                    return StageOutcome::Ok(snippets);
                }
                Ok(_) => {}
                Err(e) => warn!("Knowledge cache read failed: {e}"),
            }
        }

        let degradation_reason = match &self.search {
            Some(search) => match search.search(query, self.top_k).await {
                Ok(snippets) if !snippets.is_empty() => {
                    if let Some(cache) = &self.cache {
                        // Best-effort write: a cold cache is not worth failing the turn
                        if let Err(e) = cache.set(&key, &snippets, self.cache_ttl).await {
                            warn!("Knowledge cache write failed: {e}");
                        }
                    }
                    return StageOutcome::Ok(snippets);
                }
                Ok(_) => "vector search returned no results".to_owned(),
                Err(e) => {
                    warn!("Vector search failed: {e}");
                    format!("vector search failed: {e}")
                }
            },
            None => "no search backend configured".to_owned(),
        };

        StageOutcome::Degraded {
            value: FALLBACK_SNIPPETS.iter().map(|s| (*s).to_owned()).collect(),
            reason: degradation_reason,
        }
    }
}
