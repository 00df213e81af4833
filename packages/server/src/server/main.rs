// Main entry point for the blog generation service

use std::sync::Arc;

use anyhow::{Context, Result};
use blog_core::domains::blog::PgBlogStore;
use blog_core::domains::generation::{BlogGenerator, WritingCrew};
use blog_core::kernel::{BaseBlogStore, BlogScheduler, OpenAIClient, SerperClient};
use blog_core::server::{build_app, AppState};
use blog_core::{Config, RunMode};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "server", about = "Scheduled blog generation service")]
struct Cli {
    /// Run mode (overrides RUN_MODE)
    #[arg(long)]
    mode: Option<RunMode>,

    /// HTTP port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,blog_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(mode) = cli.mode {
        config.run_mode = mode;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::info!(mode = %config.run_mode, "Starting Blog Generation Service");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let pg_store = PgBlogStore::new(pool);
    tracing::info!("Running database migrations...");
    pg_store.migrate().await?;
    tracing::info!("Migrations complete");
    let store: Arc<dyn BaseBlogStore> = Arc::new(pg_store.clone());

    // Writing crew: OpenAI agents, optionally grounded by Serper search
    let mut openai = OpenAIClient::new(config.openai_api_key.clone()).with_model(&config.openai_model);
    if let Some(base_url) = &config.openai_base_url {
        openai = openai.with_base_url(base_url);
    }
    let mut crew = WritingCrew::new(Arc::new(openai));
    match &config.serper_api_key {
        Some(key) => crew = crew.with_search(Arc::new(SerperClient::new(key.clone())?)),
        None => tracing::warn!("SERPER_API_KEY not set, research runs without web search"),
    }

    let generator = Arc::new(BlogGenerator::new(Arc::new(crew), store.clone()));
    let scheduler = Arc::new(
        BlogScheduler::new(generator.clone(), store.clone())
            .with_misfire_grace(config.misfire_grace),
    );

    scheduler
        .start(config.generation_interval_minutes)
        .await
        .context("Failed to start scheduler")?;

    match config.run_mode {
        RunMode::Api => {
            let app = build_app(AppState::new(store, generator, scheduler.clone()));

            let addr = format!("0.0.0.0:{}", config.port);
            tracing::info!("Starting server on {}", addr);
            tracing::info!("Health check: http://localhost:{}/health", config.port);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .context("Failed to bind to address")?;

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Server error")?;
        }
        RunMode::Standalone => {
            tracing::info!("Generating first blog post...");
            match scheduler.generate_now().await {
                Some(post) => tracing::info!(post_id = post.id, title = %post.title, "First blog post generated"),
                None => tracing::warn!("First blog post generation failed"),
            }

            tracing::info!("Standalone mode running, press Ctrl+C to stop");
            shutdown_signal().await;
        }
    }

    tracing::info!("Shutting down...");
    scheduler.stop().await?;
    pg_store.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
