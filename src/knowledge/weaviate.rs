// ABOUTME: Weaviate vector search client using the GraphQL nearText API
// ABOUTME: Extracts content strings from the configured collection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

use super::KnowledgeSearch;
use crate::config::environment::KnowledgeSettings;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

const CONNECT_TIMEOUT_SECS: u64 = 5;
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Weaviate GraphQL search client
pub struct WeaviateSearch {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
}

impl WeaviateSearch {
    /// Create a client from knowledge settings
    ///
    /// Returns `None` when no search URL is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn from_settings(settings: &KnowledgeSettings) -> AppResult<Option<Self>> {
        let Some(base_url) = settings.base_url.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Some(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
            collection: settings.collection.clone(),
        }))
    }

    fn graphql_url(&self) -> String {
        format!("{}/v1/graphql", self.base_url.trim_end_matches('/'))
    }

    fn build_query(&self, query: &str, limit: usize) -> Value {
        // nearText over the content field of the configured class
        let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
        json!({
            "query": format!(
                "{{ Get {{ {} (nearText: {{ concepts: [\"{}\"] }}, limit: {}) {{ content }} }} }}",
                self.collection, escaped, limit
            )
        })
    }
}

#[async_trait]
impl KnowledgeSearch for WeaviateSearch {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<String>> {
        debug!("Searching {} for relevant content", self.collection);

        let mut request = self
            .client
            .post(self.graphql_url())
            .header("Content-Type", "application/json")
            .json(&self.build_query(query, limit));

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(|e| {
            error!("Weaviate request failed: {}", e);
            AppError::external_service("weaviate", format!("Request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(
                "weaviate",
                format!("Search returned status {status}"),
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::external_service("weaviate", format!("Failed to parse response: {e}"))
        })?;

        let snippets = body
            .pointer(&format!("/data/Get/{}", self.collection))
            .and_then(Value::as_array)
            .map(|objects| {
                objects
                    .iter()
                    .filter_map(|obj| obj.get("content"))
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(snippets)
    }
}
