// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared fixtures for exercising the intake service end to end.

#![allow(dead_code)]

pub mod generators;
pub mod metrics;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use contact_intake::{
    config::{Config, RateLimitConfig},
    handlers::{build_router, AppState},
    intake::ContactIntake,
    limiter::FixedWindowLimiter,
    metrics::IntakeMetrics,
    notifier::{Notification, Notifier, NotifyError},
    store::SqlSubmissionStore,
};
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Notifier that keeps every message, optionally failing instead.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Rejected {
                status: 503,
                body: "mail service unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// A router wired to an in-memory database and a recording notifier.
pub struct TestApp {
    pub router: Router,
    pub store: SqlSubmissionStore,
    pub notifier: Arc<RecordingNotifier>,
}

pub async fn memory_store() -> SqlSubmissionStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqlSubmissionStore::from_pool(pool).await.unwrap()
}

pub async fn test_app(rate_limit: RateLimitConfig, notifier: RecordingNotifier) -> TestApp {
    let config = Config {
        rate_limit,
        ..Default::default()
    };
    let store = memory_store().await;
    let notifier = Arc::new(notifier);

    let intake = ContactIntake::new(
        &config,
        Arc::new(FixedWindowLimiter::new(&config.rate_limit)),
        Arc::new(store.clone()),
        notifier.clone(),
        IntakeMetrics::new().unwrap(),
    );
    let router = build_router(Arc::new(AppState { intake, config })).unwrap();

    TestApp {
        router,
        store,
        notifier,
    }
}

impl TestApp {
    pub async fn with_defaults() -> Self {
        test_app(RateLimitConfig::default(), RecordingNotifier::default()).await
    }

    /// Send a request from `client` and return the response.
    pub async fn request(&self, method: Method, client: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri("/api/contact")
            .header("content-type", "application/json")
            .header("x-forwarded-for", client)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn submit(&self, client: &str, body: &serde_json::Value) -> Response<Body> {
        self.request(Method::POST, client, &body.to_string()).await
    }
}

/// Collect a response body as JSON.
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn raw_body(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
