//! Vitatone Backend
//!
//! Personalized weekly health plans, BMI and calorie calculators, activity
//! tracking and generator-backed advice.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic
//! - Repositories: Persistence behind the `HealthStore` trait
//! - Generator: Text generation behind the `TextGenerator` trait

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitatone_backend::{
    config::{self, StorageBackend},
    generator,
    repositories::{HealthStore, InMemoryHealthStore, PgHealthStore},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        storage = ?config.storage.backend,
        "Starting Vitatone Backend"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // The server starts even when the database is down; the store reconnects on use
    let store: Arc<dyn HealthStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            Arc::new(PgHealthStore::connect(&config.database).await)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data will not survive a restart");
            Arc::new(InMemoryHealthStore::new())
        }
    };

    let generator = generator::from_config(&config.ai);

    // Create application state
    let mut state = AppState::new(store, generator, config.clone());
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!(error = %e, "Prometheus recorder not installed, /metrics disabled"),
    }

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "vitatone_backend=info,tower_http=info".into()
        } else {
            "vitatone_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.server.request_timeout_secs == 0 {
        errors.push("server.request_timeout_secs must be greater than zero");
    }

    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("In-memory storage selected for production - data is lost on restart");
        }
        StorageBackend::Postgres => {
            if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
                warn!("Database URL contains localhost - ensure this is intentional for production");
            }
        }
    }

    if config.ai.enabled && config.ai.api_key().is_none() {
        warn!("No Gemini API key configured - plan generation and advice will return 503");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
