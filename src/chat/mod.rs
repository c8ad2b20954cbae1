// ABOUTME: Chat pipeline module - per-turn orchestration of the coaching flow
// ABOUTME: Stage outcomes, prompt assembly, completion client, and the pipeline itself
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! Chat pipeline
//!
//! One chat turn runs: context load, history fetch, daily prompt resolution,
//! knowledge retrieval, prompt assembly, completion, persistence, activity
//! tracking. Stages return [`outcome::StageOutcome`] so degradation is
//! observable without changing the product-visible response.

pub mod assembler;
pub mod completion;
pub mod outcome;
pub mod pipeline;

pub use completion::{CompletionClient, EMPTY_COMPLETION_REPLY, TECHNICAL_DIFFICULTIES_REPLY};
pub use outcome::StageOutcome;
pub use pipeline::{ChatPipeline, ChatTurnRequest, ChatTurnResponse, CATCH_ALL_REPLY};
