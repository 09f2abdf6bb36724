// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use foundry_client::{FoundryClient, FoundryConfig};
use server_core::domains::pipeline::PipelineSettings;
use server_core::kernel::{start_scheduler, FoundryAdapter, ServerDeps, SimpleScraper};
use server_core::server::{build_app, AppState};
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Campus Directory API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(branch = %config.foundry_branch, host = %config.foundry_hostname, "Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Platform client
    let foundry = FoundryClient::new(FoundryConfig {
        branch_name: config.foundry_branch.clone(),
        https_proxy: config.https_proxy.clone(),
        ..FoundryConfig::new(&config.foundry_hostname, &config.foundry_token)
    })
    .context("Failed to create Foundry client")?;
    tracing::info!(base_url = %foundry.base_url(), "Foundry client ready");

    let deps = ServerDeps::new(
        pool,
        Arc::new(FoundryAdapter::new(Arc::new(foundry))),
        Arc::new(SimpleScraper::new()?),
        PipelineSettings::from_config(&config),
    );

    // Background jobs
    let _scheduler = start_scheduler(deps.clone(), &config.scrape_request_cron)
        .await
        .context("Failed to start scheduler")?;

    // Build application
    let app = build_app(
        AppState::new(deps, config.foundry_hostname.clone()),
        &config.allowed_origins,
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
