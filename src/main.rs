//! # Chess Sessions
//!
//! Timed chess session coordinator.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Session registry and game service

use anyhow::Result;
use tracing::info;

use chess_sessions::config::Settings;
use chess_sessions::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    chess_sessions::telemetry::init_tracing();

    info!("Starting chess session coordinator...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        environment = %settings.environment,
        ai_enabled = settings.ai.enabled,
        event_buffer = settings.sessions.event_buffer,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Ready to host games");
    application.run_until_stopped().await?;

    Ok(())
}
