// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Intake failures and their HTTP representation.

use crate::notifier::NotifyError;
use crate::store::StoreError;
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const VALIDATION_FAILED_MESSAGE: &str = "נתונים לא תקינים";
pub const PROCESSING_FAILED_MESSAGE: &str =
    "אירעה שגיאה בשליחת הטופס. נא לנסות שוב או ליצור קשר טלפונית.";

/// Why a submission was not accepted.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("יותר מדי בקשות. נא לנסות שוב בעוד {window_minutes} דקות.")]
    RateLimited {
        window_minutes: u64,
        retry_after: Duration,
    },

    #[error("נתונים לא תקינים")]
    ValidationFailed(Vec<ValidationError>),

    #[error("Failed to save submission: {0}")]
    PersistenceFailed(#[source] StoreError),

    #[error("Failed to send notification for submission {submission_id}: {source}")]
    NotificationFailed {
        submission_id: i64,
        #[source]
        source: NotifyError,
    },
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::PersistenceFailed(_) | Self::NotificationFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::RateLimited { .. } => "rate_limited",
            Self::ValidationFailed(_) => "validation_failed",
            Self::PersistenceFailed(_) => "persistence_failed",
            Self::NotificationFailed { .. } => "notification_failed",
        }
    }

    /// Body shown to the caller. Sink failures never expose their cause.
    pub fn to_body(&self) -> ErrorResponse {
        match self {
            Self::ValidationFailed(errors) => ErrorResponse {
                error: VALIDATION_FAILED_MESSAGE.to_string(),
                details: Some(errors.iter().map(ToString::to_string).collect()),
            },
            Self::PersistenceFailed(_) | Self::NotificationFailed { .. } => ErrorResponse {
                error: PROCESSING_FAILED_MESSAGE.to_string(),
                details: None,
            },
            other => ErrorResponse {
                error: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(self.to_body());

        match self {
            Self::RateLimited { retry_after, .. } => {
                // Round up so clients never retry a moment too early
                let secs = retry_after
                    .as_secs()
                    .saturating_add(u64::from(retry_after.subsec_nanos() > 0));
                (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
