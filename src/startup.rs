//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::application::services::{
    AuthService, BootstrapAdmin, UploadLimits, UploadService, UploadServiceImpl,
};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::storage::{ObjectStorage, S3Presigner, StorageError};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{
    auth_service, cors, create_security_headers_layer, create_trace_layer, track_metrics,
    RateLimiter,
};
use crate::shared::snowflake::SnowflakeGenerator;

/// How often idle login rate limit entries are dropped
const LIMITER_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub storage: Arc<dyn ObjectStorage>,
    pub settings: Arc<Settings>,
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Assemble state around an existing pool.
    pub fn new(db: PgPool, settings: Settings) -> Result<Self, StorageError> {
        let storage: Arc<dyn ObjectStorage> = Arc::new(S3Presigner::new(&settings.storage)?);
        Ok(Self {
            db,
            snowflake: Arc::new(SnowflakeGenerator::new(
                settings.snowflake.machine_id,
                settings.snowflake.epoch,
            )),
            storage,
            login_limiter: Arc::new(RateLimiter::from_settings(&settings.rate_limit)),
            settings: Arc::new(settings),
        })
    }

    /// Upload policy and presigning over the configured bucket.
    pub fn uploads(&self) -> Arc<dyn UploadService> {
        Arc::new(UploadServiceImpl::new(
            self.storage.clone(),
            UploadLimits::from_settings(&self.settings.uploads),
            self.settings.storage.presign_expiry_secs,
        ))
    }
}

/// Full router with all middleware applied.
pub fn build_router(state: AppState) -> Router {
    let settings = state.settings.clone();
    routes::create_router(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(create_trace_layer())
        .layer(CompressionLayer::new())
        .layer(cors::create_cors_layer(&settings.cors))
        .layer(create_security_headers_layer(&settings))
}

/// Create the first admin when configured and no user exists yet.
async fn bootstrap_admin(state: &AppState) -> Result<()> {
    let bootstrap = &state.settings.bootstrap;
    let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) else {
        return Ok(());
    };
    let username = bootstrap.admin_username.clone().unwrap_or_else(|| "admin".into());

    let created = auth_service(state)
        .bootstrap_admin(BootstrapAdmin {
            email: email.clone(),
            username,
            password: password.clone(),
        })
        .await
        .map_err(|e| anyhow::anyhow!("admin bootstrap failed: {}", e))?;

    if let Some(user) = created {
        tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    }
    Ok(())
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let db = database::create_pool(&settings.database)
            .await
            .context("connecting to the database")?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("running migrations")?;
            tracing::info!("Database migrations applied");
        }

        let addr: SocketAddr = settings
            .server_addr()
            .parse()
            .with_context(|| format!("invalid server address {}", settings.server_addr()))?;

        let state = AppState::new(db, settings).context("configuring object storage")?;
        bootstrap_admin(&state).await?;

        let limiter = state.login_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LIMITER_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                limiter.purge_idle();
            }
        });

        let router = build_router(state);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
