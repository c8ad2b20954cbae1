// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into typed config structs with documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use crate::errors::{AppError, AppResult};
use std::env;

/// Complete server configuration, built once from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port (`HTTP_PORT`, default 8080)
    pub http_port: u16,
    /// Database settings
    pub database: DatabaseConfig,
    /// Completion provider settings
    pub llm: LlmConfig,
    /// Cache backend settings
    pub cache: CacheSettings,
    /// Vector search settings
    pub knowledge: KnowledgeSettings,
    /// Chat pipeline tuning
    pub chat: ChatSettings,
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL (`DATABASE_URL`, default `sqlite:data/summit_coach.db`)
    pub url: String,
    /// Maximum pool connections (`DATABASE_MAX_CONNECTIONS`, default 10)
    pub max_connections: u32,
}

/// Completion provider settings (OpenAI-compatible endpoint)
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL (`OPENAI_BASE_URL`, default `https://api.openai.com/v1`)
    pub base_url: String,
    /// API key (`OPENAI_API_KEY`, optional for keyless local endpoints)
    pub api_key: Option<String>,
    /// Model name (`OPENAI_MODEL`, default `gpt-4`)
    pub model: String,
    /// Completion token cap (`LLM_MAX_TOKENS`, default 500)
    pub max_tokens: u32,
    /// Sampling temperature (`LLM_TEMPERATURE`, default 0.7)
    pub temperature: f32,
}

/// Cache backend settings
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Redis URL (`REDIS_URL`); absent selects the in-process LRU cache
    pub redis_url: Option<String>,
    /// In-memory cache capacity (`CACHE_MAX_ENTRIES`, default 1000)
    pub max_entries: usize,
    /// In-memory expired-entry sweep interval in seconds (default 300)
    pub cleanup_interval_secs: u64,
    /// Run the background sweep task (disabled in tests)
    pub enable_background_cleanup: bool,
    /// Knowledge snippet cache expiry in seconds (default 3600)
    pub knowledge_ttl_secs: u64,
    /// Redis connection tuning
    pub redis_connection: RedisConnectionConfig,
}

/// Redis connection and retry tuning
#[derive(Debug, Clone)]
pub struct RedisConnectionConfig {
    /// TCP connect timeout in seconds (default 5)
    pub connection_timeout_secs: u64,
    /// Per-command response timeout in seconds (default 2)
    pub response_timeout_secs: u64,
    /// Initial connection attempts before giving up (default 3)
    pub initial_connection_retries: u64,
    /// First retry delay in milliseconds (default 250)
    pub initial_retry_delay_ms: u64,
    /// Retry delay cap in milliseconds (default 5000)
    pub max_retry_delay_ms: u64,
}

impl Default for RedisConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: 5,
            response_timeout_secs: 2,
            initial_connection_retries: 3,
            initial_retry_delay_ms: 250,
            max_retry_delay_ms: 5000,
        }
    }
}

/// Vector search settings
#[derive(Debug, Clone)]
pub struct KnowledgeSettings {
    /// Search service base URL (`WEAVIATE_URL`); absent disables vector search
    pub base_url: Option<String>,
    /// Search service API key (`WEAVIATE_API_KEY`, optional)
    pub api_key: Option<String>,
    /// Collection/class queried for snippets (default `LeadershipContent`)
    pub collection: String,
    /// Snippets requested per query (default 3)
    pub top_k: usize,
}

/// Chat pipeline tuning
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Messages fetched per history load (`CHAT_HISTORY_LIMIT`, default 10)
    pub history_limit: i64,
    /// Total journey length in days, used for the progress string (default 180)
    pub journey_length_days: u32,
    /// End-to-end pipeline deadline in seconds (`CHAT_DEADLINE_SECS`, default 30)
    pub request_deadline_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_limit: 10,
            journey_length_days: 180,
            request_deadline_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error when a variable is present but unparseable
    /// (a bad port or numeric knob); absent variables fall back to defaults.
    pub fn from_env() -> AppResult<Self> {
        let http_port = parse_env("HTTP_PORT", 8080)?;

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/summit_coach.db".into()),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
        };

        let llm = LlmConfig {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            api_key: env::var("OPENAI_API_KEY").ok(),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".into()),
            max_tokens: parse_env("LLM_MAX_TOKENS", 500)?,
            temperature: parse_env("LLM_TEMPERATURE", 0.7)?,
        };

        let cache = CacheSettings {
            redis_url: env::var("REDIS_URL").ok(),
            max_entries: parse_env("CACHE_MAX_ENTRIES", 1000)?,
            cleanup_interval_secs: parse_env("CACHE_CLEANUP_INTERVAL_SECS", 300)?,
            enable_background_cleanup: true,
            knowledge_ttl_secs: parse_env("KNOWLEDGE_CACHE_TTL_SECS", 3600)?,
            redis_connection: RedisConnectionConfig::default(),
        };

        let knowledge = KnowledgeSettings {
            base_url: env::var("WEAVIATE_URL").ok(),
            api_key: env::var("WEAVIATE_API_KEY").ok(),
            collection: env::var("WEAVIATE_COLLECTION")
                .unwrap_or_else(|_| "LeadershipContent".into()),
            top_k: parse_env("KNOWLEDGE_TOP_K", 3)?,
        };

        let chat = ChatSettings {
            history_limit: parse_env("CHAT_HISTORY_LIMIT", 10)?,
            journey_length_days: parse_env("JOURNEY_LENGTH_DAYS", 180)?,
            request_deadline_secs: parse_env("CHAT_DEADLINE_SECS", 30)?,
        };

        Ok(Self {
            http_port,
            database,
            llm,
            cache,
            knowledge,
            chat,
        })
    }

    /// One-line startup summary, with secrets elided
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} db={} model={} cache={} search={}",
            self.http_port,
            self.database.url,
            self.llm.model,
            if self.cache.redis_url.is_some() {
                "redis"
            } else {
                "memory"
            },
            if self.knowledge.base_url.is_some() {
                "enabled"
            } else {
                "disabled"
            },
        )
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for {name}: {raw}"))),
        Err(_) => Ok(default),
    }
}
