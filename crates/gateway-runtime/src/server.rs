//! Server lifecycle: wire the sensor API to the outputs, serve, shut down.

use crate::config::GatewayConfig;
use anyhow::Context;
use axum::Router;
use sg_03_events::ParserRegistry;
use sg_04_output::build_router;
use sg_05_sensor_api::{router, SensorApi};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// Run the gateway until SIGINT or SIGTERM.
///
/// HTTP is drained first so no request can reach an output after it has been
/// closed. Outputs are drained second.
pub async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let outputs = build_router(&config.outputs).context("Failed to create outputs")?;
    let tokens = config
        .token_processor()
        .context("Failed to create token processor")?;

    let api = Arc::new(SensorApi::new(
        tokens,
        config.sensor.install.verifiers.iter().cloned(),
        Arc::new(ParserRegistry::with_defaults()),
        outputs.clone(),
    ));
    info!(
        groups = api.group_count(),
        outputs = outputs.len(),
        "Sensor API configured"
    );

    let app = router(api, config.sensor.api.max_body_bytes);
    let addr = config.sensor.api.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "Sensor API listening");

    let served = serve(listener, app, shutdown_signal(), config.shutdown.http).await;

    if !outputs.shutdown(config.shutdown.outputs).await {
        warn!("Some outputs did not finish draining");
    }
    info!("Gateway stopped");

    served.context("HTTP server failed")
}

/// Serve `app` until `signal` resolves, then give open connections up to
/// `grace` to finish.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stopping_tx, mut stopping_rx) = watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            info!("Shutdown requested. Draining HTTP connections");
            let _ = stopping_tx.send(true);
        })
        .into_future();

    let drain_deadline = async move {
        let _ = stopping_rx.wait_for(|stopping| *stopping).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result,
        _ = drain_deadline => {
            warn!(grace_ms = grace.as_millis() as u64, "HTTP connections still open after grace period");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
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
}
