//! Chat agent server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_agent_config::{load_settings, Settings};
use chat_agent_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > optional config file > defaults
    let config_path = std::env::var("CHAT_AGENT_CONFIG").ok();
    let settings = match load_settings(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Warning: Failed to load config: {e}. Using defaults.");
            Settings::default()
        }
    };

    init_tracing();

    tracing::info!("Starting chat agent server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_path = config_path.as_deref().unwrap_or("default"),
        prediction_endpoint = %settings.prediction.endpoint,
        "Configuration loaded"
    );

    let export_interval = settings.export.interval_secs;
    let port = settings.server.port;
    let host = settings.server.host.clone();

    let state = AppState::new(settings)?;

    // Periodic knowledge export for the prediction service's indexer
    if export_interval > 0 {
        let exporter = Arc::clone(&state.exporter);
        tokio::spawn(exporter.run_periodic(Duration::from_secs(export_interval)));
        tracing::info!(interval_secs = export_interval, "Periodic knowledge export scheduled");
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chat_agent=info,tower_http=info".into());

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
