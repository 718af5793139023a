//! # TalentHub API Server
//!
//! This is the main API server for TalentHub, a hiring platform backend
//! serving candidates and recruiters.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Session authentication (register, login, check, profile)
//! - Job posting CRUD and public catalog search
//! - Application submission and recruiter review
//! - Resume uploads to S3-compatible object storage
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p talenthub-api
//! ```

use std::sync::Arc;

use talenthub_api::{
    app::{build_router, AppState},
    config::Config,
};
use talenthub_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    storage::S3ResumeStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talenthub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TalentHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // Dev convenience; in production the database already exists
    ensure_database_exists(&config.database.url).await?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    tracing::info!("Database pool initialized");

    run_migrations(&pool).await?;
    tracing::info!("Migrations applied");

    let s3 = build_s3_client(&config).await;
    let storage = Arc::new(S3ResumeStore::new(
        s3,
        config.storage.bucket.clone(),
        config.storage.public_base_url.clone(),
    ));
    tracing::info!("Resume store initialized (bucket: {})", config.storage.bucket);

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), storage, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, draining...");
    close_pool(pool).await;

    Ok(())
}

/// Constructs an S3 client for AWS or any S3-compatible store (MinIO)
///
/// Credentials come from the standard AWS environment/profile chain; a
/// custom endpoint switches the client to a local or self-hosted store.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(endpoint) = &config.storage.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let s3_config = loader.load().await;
    aws_sdk_s3::Client::new(&s3_config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
