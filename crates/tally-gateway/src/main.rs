//! tally gateway binary.
//!
//! - Vote API: /api/votes, /api/votes/{key}
//! - Ops: /healthz, /readyz, /metrics, /ops/health
//! - Background health/load reporter (when `health.enabled`)
//!
//! Usage: `tally-gateway [config.yaml]` (default `tally.yaml`).

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use tally_core::error::{Result, TallyError};
use tally_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "tally-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "tally.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.gateway.listen_addr()?;

    let state = AppState::new(cfg);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = state.health_reporter().map(|r| r.spawn(shutdown_rx));
    if reporter.is_none() {
        tracing::info!("health reporting disabled");
    }

    let app = router::build_router(state.clone());

    tracing::info!(%listen, "tally-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| TallyError::Internal(format!("bind {listen} failed: {e}")))?;

    let draining = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            draining.set_draining();
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| TallyError::Internal(format!("server failed: {e}")))?;

    if let Some(handle) = reporter {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "health reporter task ended abnormally");
        }
    }
    tracing::info!("tally-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
