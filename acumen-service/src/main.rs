//! Wallet session, deposit-address, and balance HTTP service.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p acumen-service --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p acumen-service
//!
//! # Configure logging level
//! RUST_LOG=info cargo run -p acumen-service
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to TOML configuration file (default: `config.toml`)
//! - `HOST` — Override bind address (default: `0.0.0.0`)
//! - `PORT` — Override port (default: `8080`)
//! - `RUST_LOG` — Log level filter (default: `info`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use tower_http::cors;
use tracing_subscriber::EnvFilter;

use acumen::portfolio::Aggregator;
use acumen_evm::EvmBalanceSource;
use acumen_http::{CoinGeckoClient, PrivyConfig, PrivyIdentityClient};

use acumen_service::config::ServiceConfig;
use acumen_service::handlers::{AppState, ServiceState, service_router};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Wallet service failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::load()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        chains = config.supported_chains.len(),
        "Loaded configuration"
    );

    let registry = Arc::new(config.build_registry()?);

    let identity_config = config.identity.clone().unwrap_or_else(|| {
        tracing::warn!(
            "No identity credentials configured — sessions will use deterministic addresses"
        );
        PrivyConfig {
            app_id: String::new(),
            app_secret: String::new(),
            base_url: acumen_http::identity::DEFAULT_BASE_URL.to_owned(),
        }
    });
    let identity = PrivyIdentityClient::new(&identity_config)
        .map_err(|e| format!("Invalid identity base URL: {e}"))?;

    let prices = match &config.price_api_url {
        Some(url) => CoinGeckoClient::with_base_url(
            url.parse().map_err(|e| format!("Invalid price API URL: {e}"))?,
        ),
        None => CoinGeckoClient::new(),
    };
    let aggregator = Aggregator::new(EvmBalanceSource::new(registry), prices);

    let state: ServiceState = Arc::new(AppState {
        identity,
        aggregator,
        supported_chains: config.supported_chains.clone(),
        supported_tokens: config.supported_tokens.clone(),
        strategy: config.strategy.clone(),
    });

    let app = service_router(state).layer(
        cors::CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(cors::Any),
    );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Wallet service listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Wallet service shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
