// ABOUTME: Integration tests for knowledge snippet retrieval
// ABOUTME: Covers cache short-circuiting, TTL write-back, and static fallback behavior
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::MockSearch;
use std::sync::Arc;
use std::time::Duration;
use summit_coach::cache::factory::Cache;
use summit_coach::cache::{CacheConfig, CacheKey};
use summit_coach::knowledge::{KnowledgeRetriever, KnowledgeSearch, FALLBACK_SNIPPETS};

async fn memory_cache() -> Cache {
    Cache::new(CacheConfig {
        max_entries: 100,
        redis_url: None,
        cleanup_interval: Duration::from_secs(300),
        enable_background_cleanup: false,
        redis_connection: summit_coach::config::RedisConnectionConfig::default(),
    })
    .await
    .expect("memory cache")
}

#[tokio::test]
async fn test_cache_hit_short_circuits_search() {
    let cache = memory_cache().await;
    let cached = vec!["cached snippet".to_owned()];
    cache
        .set(
            &CacheKey::knowledge("delegation"),
            &cached,
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

    let search = Arc::new(MockSearch::with_results(&["fresh snippet"]));
    let retriever = KnowledgeRetriever::new(
        Some(cache),
        Some(search.clone() as Arc<dyn KnowledgeSearch>),
        3,
        Duration::from_secs(3600),
    );

    let outcome = retriever.retrieve("delegation").await;
    assert!(!outcome.is_degraded());
    assert_eq!(outcome.into_value(), cached);
    assert_eq!(search.calls(), 0);
}

#[tokio::test]
async fn test_cache_miss_searches_and_writes_back_with_ttl() {
    let cache = memory_cache().await;
    let search = Arc::new(MockSearch::with_results(&["one", "two", "three", "four"]));
    let retriever = KnowledgeRetriever::new(
        Some(cache.clone()),
        Some(search.clone() as Arc<dyn KnowledgeSearch>),
        3,
        Duration::from_secs(3600),
    );

    let outcome = retriever.retrieve("trust").await;
    assert!(!outcome.is_degraded());
    let snippets = outcome.into_value();
    // top_k caps the result
    assert_eq!(snippets, vec!["one", "two", "three"]);
    assert_eq!(search.calls(), 1);

    let key = CacheKey::knowledge("trust");
    let written: Option<Vec<String>> = cache.get(&key).await.unwrap();
    assert_eq!(written, Some(snippets));

    let remaining = cache.ttl(&key).await.unwrap().expect("entry has a ttl");
    assert!(remaining <= Duration::from_secs(3600));
    assert!(remaining > Duration::from_secs(3590));

    // Second retrieval is served from cache
    retriever.retrieve("trust").await;
    assert_eq!(search.calls(), 1);
}

#[tokio::test]
async fn test_no_backend_degrades_to_static_fallback() {
    let retriever = KnowledgeRetriever::new(None, None, 3, Duration::from_secs(3600));

    let outcome = retriever.retrieve("anything").await;
    assert!(outcome.is_degraded());
    let snippets = outcome.into_value();
    assert_eq!(snippets.len(), FALLBACK_SNIPPETS.len());
    for (got, expected) in snippets.iter().zip(FALLBACK_SNIPPETS.iter()) {
        assert_eq!(got, expected);
    }
}

#[tokio::test]
async fn test_search_failure_degrades_with_reason() {
    let search = Arc::new(MockSearch::failing());
    let retriever = KnowledgeRetriever::new(
        None,
        Some(search as Arc<dyn KnowledgeSearch>),
        3,
        Duration::from_secs(3600),
    );

    let outcome = retriever.retrieve("anything").await;
    let reason = outcome.degradation_reason().expect("degraded").to_owned();
    assert!(reason.contains("vector search failed"));
    assert_eq!(outcome.into_value().len(), FALLBACK_SNIPPETS.len());
}

#[tokio::test]
async fn test_empty_search_results_degrade_to_fallback() {
    let search = Arc::new(MockSearch::with_results(&[]));
    let retriever = KnowledgeRetriever::new(
        None,
        Some(search as Arc<dyn KnowledgeSearch>),
        3,
        Duration::from_secs(3600),
    );

    let outcome = retriever.retrieve("anything").await;
    assert!(outcome.is_degraded());
    assert_eq!(outcome.into_value()[0], FALLBACK_SNIPPETS[0]);
}
