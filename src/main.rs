//! # Catalog Admin
//!
//! Content management server for a music catalog.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Database connection pool and migrations
//! - HTTP server

use anyhow::Result;
use tracing::info;

use catalog_admin::config::Settings;
use catalog_admin::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings first: they pick the log format
    let settings = Settings::load()?;
    catalog_admin::telemetry::init_tracing(&settings.log_format);

    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
