use devcamper::{bootcamp, build_geocoder, create_router, create_ws_router, AppState, Config, StorageEngine};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_errors = Config::load_env_files();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devcamper=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    for (file, e) in env_errors {
        tracing::warn!("Ignoring env file {}: {}", file, e);
    }

    let config = Config::parse();
    let storage = StorageEngine::open(&config.data_dir, &[bootcamp::COLLECTION])?;
    tracing::info!("Storage engine opened at {}", config.data_dir);

    let bootcamps = bootcamp::open_collection(&storage, config.schema_validation)?;
    let geocoder = build_geocoder(&config.geocoder())?;
    tracing::info!(
        "Geocoding with {:?}, radius distances in {:?}",
        config.geocoder_provider,
        config.distance_unit
    );

    let state = AppState::new(bootcamps, geocoder).with_distance_unit(config.distance_unit);
    let app = create_router(state, config.cors_origin.as_deref());
    let ws_app = create_ws_router();

    let api_addr = config.api_addr()?;
    let ws_addr = config.ws_addr()?;
    let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
    let ws_listener = tokio::net::TcpListener::bind(ws_addr).await?;
    tracing::info!("Server listening on {}", api_addr);
    tracing::info!("WebSocket server listening on {}", ws_addr);

    let api_server = axum::serve(api_listener, app).with_graceful_shutdown(shutdown_signal());
    let ws_server = axum::serve(ws_listener, ws_app).with_graceful_shutdown(shutdown_signal());

    tokio::try_join!(
        async { api_server.await },
        async { ws_server.await },
    )?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
