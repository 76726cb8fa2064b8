// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The contact intake pipeline.
//!
//! A request passes, in order: method check, rate limit, validation,
//! persistence, notification. Persist and notify are awaited one after the
//! other with no retry. A notification failure after a successful insert is
//! still reported as a failure; the row stays stored.

use crate::config::Config;
use crate::error::IntakeError;
use crate::limiter::{RateLimitResult, RateLimitStore};
use crate::metrics::IntakeMetrics;
use crate::notifier::{Notification, Notifier};
use crate::store::SubmissionStore;
use crate::validator::ContactValidator;
use axum::http::Method;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// One inbound submission attempt.
#[derive(Debug, Clone)]
pub struct IntakeRequest<'a> {
    pub method: Method,
    /// Client address used as the rate limit key
    pub client: &'a str,
    /// Raw request body
    pub body: &'a [u8],
}

/// Runs submissions through limit, validation, storage and notification.
pub struct ContactIntake {
    limiter: Arc<dyn RateLimitStore>,
    validator: ContactValidator,
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
    metrics: IntakeMetrics,
    notify_from: String,
    notify_to: String,
}

impl ContactIntake {
    pub fn new(
        config: &Config,
        limiter: Arc<dyn RateLimitStore>,
        store: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
        metrics: IntakeMetrics,
    ) -> Self {
        Self {
            limiter,
            validator: ContactValidator::new(),
            store,
            notifier,
            metrics,
            notify_from: config.notification.from.clone(),
            notify_to: config.notification.to.clone(),
        }
    }

    pub fn limiter(&self) -> &Arc<dyn RateLimitStore> {
        &self.limiter
    }

    pub fn metrics(&self) -> &IntakeMetrics {
        &self.metrics
    }

    /// Process a submission, returning the stored submission id.
    pub async fn handle(&self, request: IntakeRequest<'_>) -> Result<i64, IntakeError> {
        let result = self.process(request).await;
        match &result {
            Ok(_) => self.metrics.record("accepted"),
            Err(err) => self.metrics.record(err.code()),
        }
        result
    }

    async fn process(&self, request: IntakeRequest<'_>) -> Result<i64, IntakeError> {
        let client = request.client;

        if request.method != Method::POST {
            debug!(client, method = %request.method, "Rejected non-POST request");
            return Err(IntakeError::MethodNotAllowed);
        }

        if let RateLimitResult::Limited { retry_after } = self.limiter.allow(client).await {
            info!(
                client,
                retry_after_secs = retry_after.as_secs(),
                "Submission rate limited"
            );
            return Err(IntakeError::RateLimited {
                window_minutes: self.limiter.window().as_secs().div_ceil(60),
                retry_after,
            });
        }

        // Unparseable bodies validate as if every field were missing
        let body: Value = serde_json::from_slice(request.body).unwrap_or(Value::Null);
        let submission = self.validator.validate(&body).map_err(|errors| {
            info!(client, error_count = errors.len(), "Submission failed validation");
            IntakeError::ValidationFailed(errors)
        })?;

        let submission_id = self
            .store
            .insert(&submission, Utc::now())
            .await
            .map_err(|err| {
                error!(client, error = %err, "Failed to store submission");
                IntakeError::PersistenceFailed(err)
            })?;

        let notification = Notification::for_submission(
            submission_id,
            &submission,
            &self.notify_from,
            &self.notify_to,
        );
        let sent = match notification {
            Ok(notification) => self.notifier.send(&notification).await,
            Err(err) => Err(err),
        };
        if let Err(source) = sent {
            error!(client, submission_id, error = %source, "Failed to send notification");
            return Err(IntakeError::NotificationFailed {
                submission_id,
                source,
            });
        }

        info!(
            client,
            submission_id,
            project_type = %submission.project_type,
            "Submission accepted"
        );
        Ok(submission_id)
    }
}
