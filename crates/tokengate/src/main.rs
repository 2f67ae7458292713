//! Tokengate - credential and session service

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig, Secrets};
use tokengate_api::{AppState, RouterOptions, create_router};
use tokengate_auth::TokenCodec;
use tokengate_core::{
    CredentialStore, DatabaseRefreshTokenStore, MemoryRefreshTokenStore, RefreshStoreKind,
    RefreshTokenStore, SessionAuthority,
};
use tokengate_db::Database;

/// Tokengate - issues and verifies access and refresh tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "TOKENGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Secret used to sign access tokens
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: String,

    /// Secret used to sign refresh tokens
    #[arg(long, env = "REFRESH_TOKEN_SECRET", hide_env_values = true)]
    refresh_token_secret: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging);

    info!("Starting Tokengate v{}", env!("CARGO_PKG_VERSION"));

    let secrets = Secrets {
        access: args.access_token_secret,
        refresh: args.refresh_token_secret,
    };
    secrets.validate()?;

    // Initialize database
    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    // Initialize stores
    let credentials: Arc<dyn CredentialStore> = Arc::new(db.clone());
    let refresh_tokens: Arc<dyn RefreshTokenStore> = match config.session.refresh_store {
        RefreshStoreKind::Memory => Arc::new(MemoryRefreshTokenStore::new()),
        RefreshStoreKind::Database => Arc::new(DatabaseRefreshTokenStore::new(db.clone())),
    };
    info!(
        "Refresh tokens kept in {} store",
        config.session.refresh_store.as_str()
    );
    warn!("Refresh tokens carry no expiry; they stay valid until logout");

    // Initialize session authority
    let sessions = Arc::new(SessionAuthority::new(
        credentials,
        refresh_tokens,
        TokenCodec::access(&secrets.access, config.session.access_token_ttl()),
        TokenCodec::refresh(&secrets.refresh),
    ));

    // Initialize metrics exporter
    let metrics_handle = if config.metrics.enabled {
        Some(Arc::new(PrometheusBuilder::new().install_recorder()?))
    } else {
        None
    };

    let state = AppState::new(sessions);
    let app = create_router(
        state,
        RouterOptions {
            metrics_handle,
            static_dir: config.server.static_dir.clone(),
        },
    )
    .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
