use std::sync::Arc;

use axum::http::Method;
use clap::Parser;
use storefront::config::{Cli, Config, default_config_dir, default_config_path};
use storefront::handler::{AppState, router};
use storefront::search::AlgoliaClient;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // --config wins; otherwise ~/.storefront/config.yaml
    let config_path = match args.config_path {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            let dir = default_config_dir();
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("failed to create config directory {:?}: {}", dir, e);
                std::process::exit(1);
            }
            default_config_path()
        }
    };

    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("storefront.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    let search = Arc::new(AlgoliaClient::new(&cfg.search).unwrap_or_else(|e| {
        tracing::error!(error = %storefront::unpack_error(&e), "failed to setup search client");
        std::process::exit(1);
    }));

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let cancellation_token = CancellationToken::new();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let app = router(AppState {
        search,
        config: Arc::new(cfg),
    })
    .layer(cors);

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        tracing::info!("ctrl+c signal received, preparing to shutdown");
        shutdown_token.cancel();
    });

    tracing::info!("storefront.svc running on {}", &address);
    let shutdown = cancellation_token.clone();
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
    {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    tracing::info!("storefront.svc going off, graceful shutdown complete");
}
