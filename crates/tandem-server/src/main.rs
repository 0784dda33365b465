use tandem_server::{AppState, build_router, load_config, resolve_config_path};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; absence is fine.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    let (config_path, source) = resolve_config_path();
    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tandem_server::observability::init_tracing(&config.logging.level);
    tracing::info!(path = %config_path, %source, "configuration loaded");

    let state = AppState::from_config(&config).await?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    tracing::info!(listen = %config.server.listen, "server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install shutdown handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
