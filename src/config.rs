// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Every field has a default; [`Config::from_env`] layers environment
//! variables (and a `.env` file, if present) on top.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },

    #[error("{var} must be at most {max}")]
    TooLarge { var: &'static str, max: u64 },
}

/// Longest accepted rate limit window and cleanup interval: one week.
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Paths the router already serves; the metrics path may not reuse them.
const RESERVED_PATHS: &[&str] = &["/api/contact", "/health", "/healthz"];

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Value sent in `Access-Control-Allow-Origin` (default: *)
    #[serde(default = "default_allow_origin")]
    pub cors_allow_origin: String,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limiting per client address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Accepted requests per window per client (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// How often expired windows are pruned, in seconds (default: 60)
    #[serde(default = "default_cleanup_secs")]
    pub cleanup_interval_secs: u64,
}

/// Submission storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Outbound email notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Resend API key; without one, notifications are only logged
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_from")]
    pub from: String,

    #[serde(default = "default_to")]
    pub to: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_cleanup_secs() -> u64 {
    60
}

fn default_database_url() -> String {
    "sqlite://contact_submissions.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_from() -> String {
    "T.S Plumbing <onboarding@resend.dev>".to_string()
}

fn default_to() -> String {
    "z.segal.pro@gmail.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_allow_origin: default_allow_origin(),
            rate_limit: RateLimitConfig::default(),
            storage: StorageConfig::default(),
            notification: NotificationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            cleanup_interval_secs: default_cleanup_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            from: default_from(),
            to: default_to(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the cleanup interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl NotificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if it
    /// exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup("BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = lookup("CORS_ALLOW_ORIGIN") {
            config.cors_allow_origin = v;
        }

        let rl = &mut config.rate_limit;
        override_parsed(&lookup, "RATE_LIMIT_MAX_REQUESTS", &mut rl.max_requests)?;
        override_parsed(&lookup, "RATE_LIMIT_WINDOW_SECS", &mut rl.window_secs)?;
        override_parsed(&lookup, "RATE_LIMIT_CLEANUP_SECS", &mut rl.cleanup_interval_secs)?;
        if rl.max_requests == 0 {
            return Err(ConfigError::Zero { var: "RATE_LIMIT_MAX_REQUESTS" });
        }
        if rl.window_secs == 0 {
            return Err(ConfigError::Zero { var: "RATE_LIMIT_WINDOW_SECS" });
        }
        if rl.cleanup_interval_secs == 0 {
            return Err(ConfigError::Zero { var: "RATE_LIMIT_CLEANUP_SECS" });
        }
        for (var, secs) in [
            ("RATE_LIMIT_WINDOW_SECS", rl.window_secs),
            ("RATE_LIMIT_CLEANUP_SECS", rl.cleanup_interval_secs),
        ] {
            if secs > MAX_INTERVAL_SECS {
                return Err(ConfigError::TooLarge { var, max: MAX_INTERVAL_SECS });
            }
        }

        if let Some(v) = lookup("DATABASE_URL") {
            config.storage.database_url = v;
        }
        override_parsed(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            &mut config.storage.max_connections,
        )?;

        let n = &mut config.notification;
        n.api_key = lookup("RESEND_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(v) = lookup("RESEND_API_URL") {
            n.api_url = v;
        }
        if let Some(v) = lookup("NOTIFY_FROM") {
            n.from = v;
        }
        if let Some(v) = lookup("NOTIFY_TO") {
            n.to = v;
        }
        override_parsed(&lookup, "NOTIFY_TIMEOUT_SECS", &mut n.timeout_secs)?;

        override_parsed(&lookup, "METRICS_ENABLED", &mut config.metrics.enabled)?;
        if let Some(v) = lookup("METRICS_PATH") {
            // Router registration panics on these, so refuse them up front
            if !v.starts_with('/') || v.len() < 2 || RESERVED_PATHS.contains(&v.as_str()) {
                return Err(ConfigError::InvalidValue { var: "METRICS_PATH", value: v });
            }
            config.metrics.path = v;
        }

        Ok(config)
    }
}

fn override_parsed<F, T>(lookup: &F, var: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var) {
        *slot = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value })?;
    }
    Ok(())
}
