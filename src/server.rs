// ABOUTME: Server assembly - shared resources, router construction, and serving
// ABOUTME: Wires database, cache, search, provider, and pipeline from ServerConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Server assembly
//!
//! [`ServerResources`] owns every shared component, built once from
//! [`ServerConfig`] and handed to the router as shared state. Tests inject
//! their own provider and search backends through
//! [`ServerResources::with_components`].

use crate::auth::AuthManager;
use crate::cache::factory::Cache;
use crate::cache::CacheConfig;
use crate::chat::ChatPipeline;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::knowledge::{KnowledgeSearch, WeaviateSearch};
use crate::llm::{LlmProvider, OpenAiCompatibleProvider};
use crate::routes;
use std::sync::Arc;
use tracing::info;

/// Shared server components
pub struct ServerResources {
    /// The loaded configuration
    pub config: ServerConfig,
    /// Database handle
    pub database: Database,
    /// Cache backend
    pub cache: Cache,
    /// Per-turn chat pipeline
    pub pipeline: ChatPipeline,
    /// Credential-store authenticator
    pub auth: AuthManager,
}

impl ServerResources {
    /// Build all components from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database, cache, or outbound clients fail to
    /// initialize
    pub async fn new(config: ServerConfig) -> AppResult<Arc<Self>> {
        let database =
            Database::connect(&config.database.url, config.database.max_connections).await?;

        let provider: Arc<dyn LlmProvider> =
            Arc::new(OpenAiCompatibleProvider::from_config(&config.llm)?);

        let search: Option<Arc<dyn KnowledgeSearch>> =
            WeaviateSearch::from_settings(&config.knowledge)?
                .map(|s| Arc::new(s) as Arc<dyn KnowledgeSearch>);

        Self::with_components(config, database, provider, search).await
    }

    /// Build resources around injected provider and search backends
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    pub async fn with_components(
        config: ServerConfig,
        database: Database,
        provider: Arc<dyn LlmProvider>,
        search: Option<Arc<dyn KnowledgeSearch>>,
    ) -> AppResult<Arc<Self>> {
        let cache = Cache::new(CacheConfig::from_settings(&config.cache)).await?;

        let pipeline = ChatPipeline::new(
            database.pool().clone(),
            Some(cache.clone()),
            search,
            provider,
            &config,
        );

        let auth = AuthManager::new(database.pool().clone());

        Ok(Arc::new(Self {
            config,
            database,
            cache,
            pipeline,
            auth,
        }))
    }
}

/// Serve the HTTP API until shutdown
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn serve(resources: Arc<ServerResources>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", resources.config.http_port);
    let router = routes::router(resources.clone());

    info!("Summit Coach server listening on {addr}");
    info!("Config: {}", resources.config.summary());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
