// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake
//!
//! Server side of the T.S Plumbing website contact form. A submission goes
//! through a fixed pipeline:
//!
//! - Per-client fixed-window rate limiting (5 requests per 15 minutes default)
//! - Field validation with all problems reported at once
//! - Persistence to a SQL database, yielding a numeric submission id
//! - Email notification to the business owner

pub mod config;
pub mod error;
pub mod handlers;
pub mod intake;
pub mod limiter;
pub mod metrics;
pub mod notifier;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::IntakeError;
pub use intake::ContactIntake;
pub use limiter::{FixedWindowLimiter, RateLimitResult, RateLimitStore};
pub use notifier::{LogNotifier, Notification, Notifier, ResendNotifier};
pub use store::{SqlSubmissionStore, SubmissionStore};
pub use validator::{ContactSubmission, ContactValidator, ProjectType, ValidationError};
