// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Builds one ServerConfig from the environment, passed by reference into components
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Server configuration
//!
//! Configuration is read from the environment exactly once, at startup, into
//! a [`ServerConfig`] that is passed by reference into each component
//! constructor. Every knob has a documented default so the server boots with
//! no environment at all (in-process cache, no vector search, completion
//! calls against the default OpenAI endpoint).

pub mod environment;

pub use environment::{
    CacheSettings, ChatSettings, DatabaseConfig, KnowledgeSettings, LlmConfig,
    RedisConnectionConfig, ServerConfig,
};
