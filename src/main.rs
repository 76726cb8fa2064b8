// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Service
//!
//! Serves `POST /api/contact` for the T.S Plumbing website: rate limits per
//! client, validates the form, stores the submission and emails the owner.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and `.env`):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX_REQUESTS`: Submissions per window per client (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length, at most one week (default: 900)
//! - `DATABASE_URL`: Submission database (default: local SQLite file)
//! - `RESEND_API_KEY`: Email API key; unset means notifications are logged only
//! - `NOTIFY_FROM` / `NOTIFY_TO`: Notification sender and recipient
//! - `METRICS_ENABLED` / `METRICS_PATH`: Prometheus endpoint (default: on, /metrics)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_intake::{
    config::Config,
    handlers::{build_router, AppState},
    intake::ContactIntake,
    limiter::{FixedWindowLimiter, RateLimitStore},
    metrics::IntakeMetrics,
    notifier::{LogNotifier, Notifier, ResendNotifier},
    store::SqlSubmissionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        email_enabled = config.notification.api_key.is_some(),
        "Starting contact intake service"
    );

    let limiter = Arc::new(FixedWindowLimiter::new(&config.rate_limit));
    let store = Arc::new(SqlSubmissionStore::connect(&config.storage).await?);

    let notifier: Arc<dyn Notifier> = match &config.notification.api_key {
        Some(key) => Arc::new(ResendNotifier::new(&config.notification, key.clone())?),
        None => {
            warn!("RESEND_API_KEY not set, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let intake = ContactIntake::new(
        &config,
        limiter.clone(),
        store,
        notifier,
        IntakeMetrics::new()?,
    );

    // Spawn cleanup task
    let cleanup_every = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });

    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = Arc::new(AppState { intake, config });
    let app = build_router(state)?;

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
