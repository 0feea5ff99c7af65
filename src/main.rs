use std::sync::Arc;

use axum::http::Method;
use clap::Parser;
use signet::auth::Auth;
use signet::config::{Cli, Config, default_config_dir, default_config_path};
use signet::db::Database;
use signet::handler::{AppState, router};
use tokio::{signal, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    // Determine config path and data directory
    // If --config is provided, use its parent directory for data (database, etc.)
    // Otherwise use ~/.signet/ for both
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => {
            let dir = default_config_dir();
            (default_config_path(), dir)
        }
    };

    // Ensure data directory exists
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt().json().init();
    tracing::info!("signet.svc starting");

    let cfg = Config::new(config_path.to_str().unwrap()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    let db = Arc::new(Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let cancellation_token = CancellationToken::new();
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::channel::<()>(1);

    // Background task to sweep expired sessions every 15 minutes
    let sweeper_db = db.clone();
    let sweeper_token = cancellation_token.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(900));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let auth = Auth::new(sweeper_db.connection());
                    match auth.purge_expired_sessions().await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!("purged {} expired sessions", n),
                        Err(e) => tracing::warn!("failed to purge expired sessions: {}", e),
                    }
                }
                _ = sweeper_token.cancelled() => {
                    tracing::info!("session sweeper shutting down");
                    break;
                }
            }
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let app = router()
        .layer(cors)
        .with_state(AppState {
            db,
            session_ttl_hours: cfg.auth.get_session_ttl_hours(),
        });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("signet.svc running on {}", &address);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server exited with error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
            cancellation_token.cancel();
        }
    }

    drop(shutdown_complete_tx);
    shutdown_complete_rx.recv().await;
    tracing::info!("signet.svc going off, graceful shutdown complete");
}
