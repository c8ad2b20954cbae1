// ABOUTME: Main library entry point for the Summit Coach leadership coaching platform
// ABOUTME: Exposes the chat pipeline, persistence managers, cache, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Summit Coach API
//!
//! A leadership-coaching chat backend. Each chat turn runs a fixed pipeline:
//! load the user's coaching context, fetch recent conversation history,
//! resolve the day's curriculum prompt, retrieve relevant knowledge snippets,
//! assemble a coaching prompt, call the completion provider, persist the
//! turn, and record activity. Every stage degrades to a documented default
//! instead of failing the request.

pub mod auth;
pub mod cache;
pub mod chat;
pub mod config;
pub mod database;
pub mod errors;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod models;
pub mod routes;
pub mod server;
