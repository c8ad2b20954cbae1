// ABOUTME: Summit Coach server binary
// ABOUTME: Loads env configuration, initializes logging, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

//! # Summit Coach Server Binary
//!
//! Starts the leadership coaching API: loads configuration from the
//! environment, builds the shared server resources, and serves until
//! interrupted.

use anyhow::Result;
use clap::Parser;
use summit_coach::config::ServerConfig;
use summit_coach::logging::LoggingConfig;
use summit_coach::server::{self, ServerResources};
use tracing::info;

#[derive(Parser)]
#[command(name = "summit-coach-server")]
#[command(about = "Summit Coach - AI leadership coaching API for business owners")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Summit Coach server");

    let resources = ServerResources::new(config).await?;
    server::serve(resources).await
}
