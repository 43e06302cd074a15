//! imgpipe gateway
//!
//! Simulated image pipeline:
//! - API listener: `/images` (list / register), `/images/{id}` (transition), `/login`
//! - Metrics listener: `/metrics`, `/healthz`
//! - Both listeners drain on Ctrl-C / SIGTERM

use std::net::SocketAddr;
use std::process::ExitCode;

use axum::Router;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgpipe_core::error::{PipelineError, Result};
use imgpipe_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "imgpipe-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("IMGPIPE_CONFIG").ok();
    let cfg = config::load(path.as_deref())?;
    let api_addr = cfg.server.listen_addr()?;
    let metrics_addr = cfg.metrics.listen_addr()?;

    let state = AppState::new(cfg)?;
    tracing::info!(version = %state.cfg().app.version, "imgpipe-gateway starting");

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let api = serve("api", api_addr, router::build_router(state.clone()), stop_rx.clone());
    let metrics = serve("metrics", metrics_addr, router::build_metrics_router(state), stop_rx);
    tokio::try_join!(api, metrics)?;

    tracing::info!("imgpipe-gateway stopped");
    Ok(())
}

async fn serve(
    role: &'static str,
    listen: SocketAddr,
    app: Router,
    stop: watch::Receiver<bool>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await.map_err(|e| {
        PipelineError::Internal(format!("{role} listener bind {listen} failed: {e}"))
    })?;
    tracing::info!(%listen, role, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_stop(stop))
        .await
        .map_err(|e| PipelineError::Internal(format!("{role} server failed: {e}")))
}

async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    while !*stop.borrow() {
        if stop.changed().await.is_err() {
            return;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
