//! Finance Assistant Web Server
//!
//! Entry point: configuration, logging, then the Axum server.

#![allow(clippy::unused_async)]

use std::sync::Arc;

use dotenvy::dotenv;
use finance_assistant::{config::AppConfig, server, telemetry};
use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load()?;

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(&config.logging);

    server::start_server(Arc::new(config)).await
}
