use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mandi_core::ScraperConfig;
use mandi_core::traits::RenderSession;
use mandi_server::routes;
use mandi_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mandi=info".parse()?))
        .with_target(false)
        .init();

    let config = ScraperConfig::from_env().context("Invalid scraper configuration")?;
    let port = std::env::var("MANDI_SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    #[cfg(feature = "browser")]
    let session = mandi_client::BrowserSession::new(config.detail_timeout);
    #[cfg(not(feature = "browser"))]
    let session = mandi_core::traits::NoSession;

    serve(&addr, &config, session).await
}

async fn serve<S: RenderSession + 'static>(
    addr: &str,
    config: &ScraperConfig,
    session: S,
) -> anyhow::Result<()> {
    let service = mandi_client::build_service(config, session)?;

    // A failed launch leaves the service answering from fallback data.
    if let Err(e) = service.initialize().await {
        tracing::warn!(error = %e, "Render session unavailable, continuing in fallback mode");
    }

    let state = Arc::new(AppState::new(service.clone()));
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.close().await?;
    tracing::info!("Scraper closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
