//! Submission service binary.
//!
//! Submissions are served on the public address, health and metrics on the
//! management address (loopback by default).
//!
//! Configuration comes from `SUBMISSION_*` environment variables; log
//! filtering from `RUST_LOG` (default `info`). Set `SUBMISSION_LOG_JSON=1`
//! for JSON log lines.

use anyhow::{Context, Result};
use key_persistence::InMemoryDiagnosisKeyStore;
use std::sync::Arc;
use submission_service::{
    bind_listener, build_management_router, build_router, AppState, HttpTanVerifier,
    SubmissionConfig, SubmissionService,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;

    let json = std::env::var("SUBMISSION_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = SubmissionConfig::from_env();
    config.validate().context("invalid configuration")?;

    let tan_verifier = Arc::new(HttpTanVerifier::new(&config.verification)?);
    let repository = Arc::new(InMemoryDiagnosisKeyStore::with_capacity_limit(
        config.storage.max_stored_keys,
    ));
    let service = Arc::new(SubmissionService::new(&config, tan_verifier, repository)?);
    let router = build_router(AppState::new(service.clone(), service.metrics(), &config));
    let management = build_management_router(service.metrics());

    let addr = config.http_addr();
    let listener = bind_listener(addr).await?;
    let management_addr = config.management_addr();
    let management_listener = bind_listener(management_addr).await?;

    info!(
        addr = %addr,
        management_addr = %management_addr,
        verification_url = %config.verification.verify_url(),
        max_keys = config.payload.max_number_of_keys,
        max_stored_keys = config.storage.max_stored_keys,
        retention_days = config.retention.retention_days,
        "Submission service listening"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let management_task = tokio::spawn(async move {
        let mut shutdown_rx = shutdown_rx;
        axum::serve(management_listener, management)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await
    });

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    management_task
        .await
        .context("management listener task failed")??;

    info!("Submission service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
