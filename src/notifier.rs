// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound notification of new submissions.
//!
//! A [`Notification`] is rendered from a stored submission and handed to a
//! [`Notifier`]. [`ResendNotifier`] delivers through the Resend HTTP API;
//! [`LogNotifier`] only logs, for local runs without an API key.

use crate::config::NotificationConfig;
use crate::validator::ContactSubmission;
use askama::Template;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Notification error types.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to render notification: {0}")]
    Render(#[from] askama::Error),

    #[error("Email request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email API rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// An email ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Template)]
#[template(path = "submission_email.html")]
struct SubmissionEmail<'a> {
    submission_id: i64,
    name: &'a str,
    phone: &'a str,
    project_type: &'a str,
    description: &'a str,
}

impl Notification {
    /// Compose the owner notification for a stored submission.
    pub fn for_submission(
        submission_id: i64,
        submission: &ContactSubmission,
        from: &str,
        to: &str,
    ) -> Result<Self, NotifyError> {
        let html = SubmissionEmail {
            submission_id,
            name: &submission.name,
            phone: &submission.phone,
            project_type: submission.project_type_label(),
            description: &submission.description,
        }
        .render()?;

        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("בקשה חדשה מאתר T.S אינסטלציה - {}", submission.name),
            html,
            // The form has no email field; a phone value holding an address
            // is the only reply target available.
            reply_to: submission
                .phone
                .contains('@')
                .then(|| submission.phone.clone()),
        })
    }
}

/// Delivery capability for notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Resend email API request body.
#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

/// Sends notifications through the Resend HTTP API.
pub struct ResendNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ResendNotifier {
    pub fn new(config: &NotificationConfig, api_key: String) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let body = ResendEmail {
            from: &notification.from,
            to: [&notification.to],
            subject: &notification.subject,
            html: &notification.html,
            reply_to: notification.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Notification accepted by email API");
        Ok(())
    }
}

/// Logs notifications instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            html_bytes = notification.html.len(),
            "Email delivery disabled, notification logged only"
        );
        Ok(())
    }
}
