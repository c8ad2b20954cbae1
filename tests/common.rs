// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database setup, mock providers, and server resource builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared test utilities for `summit_coach`
//!
//! Common setup functions to reduce duplication across integration tests:
//! an in-memory database, deterministic mock backends for completion and
//! vector search, and a full `ServerResources` builder.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use summit_coach::config::{
    CacheSettings, ChatSettings, DatabaseConfig, KnowledgeSettings, LlmConfig,
    RedisConnectionConfig, ServerConfig,
};
use summit_coach::database::Database;
use summit_coach::errors::{AppError, AppResult};
use summit_coach::knowledge::KnowledgeSearch;
use summit_coach::llm::{ChatRequest, ChatResponse, LlmProvider};
use summit_coach::server::ServerResources;

/// Open a fresh in-memory database with the full schema applied
///
/// A single pooled connection keeps the in-memory database alive for the
/// whole test.
pub async fn test_database() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    Database::from_pool(pool).await.expect("schema bootstrap")
}

/// Configuration with test-friendly knobs: no Redis, no background cleanup
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
        },
        llm: LlmConfig {
            base_url: "http://localhost:1".to_owned(),
            api_key: None,
            model: "gpt-4".to_owned(),
            max_tokens: 500,
            temperature: 0.7,
        },
        cache: CacheSettings {
            redis_url: None,
            max_entries: 100,
            cleanup_interval_secs: 300,
            enable_background_cleanup: false,
            knowledge_ttl_secs: 3600,
            redis_connection: RedisConnectionConfig::default(),
        },
        knowledge: KnowledgeSettings {
            base_url: None,
            api_key: None,
            collection: "LeadershipContent".to_owned(),
            top_k: 3,
        },
        chat: ChatSettings {
            history_limit: 10,
            journey_length_days: 180,
            request_deadline_secs: 30,
        },
    }
}

/// Completion backend returning a canned reply, or failing on demand
pub struct MockLlm {
    reply: Option<String>,
    calls: AtomicUsize,
    last_system_prompt: Mutex<Option<String>>,
}

impl MockLlm {
    /// Mock that always answers with `reply`
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_owned()),
            calls: AtomicUsize::new(0),
            last_system_prompt: Mutex::new(None),
        }
    }

    /// Mock that fails every completion call
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_system_prompt: Mutex::new(None),
        }
    }

    /// Number of completion calls observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The system prompt of the most recent completion call
    pub fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Mock Provider"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(system) = request.messages.first() {
            *self.last_system_prompt.lock().unwrap() = Some(system.content.clone());
        }

        match &self.reply {
            Some(reply) => Ok(ChatResponse {
                content: reply.clone(),
                model: "mock-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            None => Err(AppError::external_service("mock", "simulated outage")),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(self.reply.is_some())
    }
}

/// Search backend serving fixed snippets, counting calls
pub struct MockSearch {
    results: Vec<String>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockSearch {
    /// Mock returning the given snippets on every search
    pub fn with_results(results: &[&str]) -> Self {
        Self {
            results: results.iter().map(|s| (*s).to_owned()).collect(),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Mock that fails every search call
    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of search calls observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeSearch for MockSearch {
    async fn search(&self, _query: &str, limit: usize) -> AppResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::external_service("mock-search", "simulated outage"));
        }
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

/// Build full server resources around an in-memory database and mocks
pub async fn test_resources(
    provider: Arc<MockLlm>,
    search: Option<Arc<MockSearch>>,
) -> Arc<ServerResources> {
    let database = test_database().await;
    ServerResources::with_components(
        test_config(),
        database,
        provider,
        search.map(|s| s as Arc<dyn KnowledgeSearch>),
    )
    .await
    .expect("test resources")
}
