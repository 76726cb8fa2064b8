// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the contact endpoint.
//!
//! Each client key gets a counter and a window expiry. The first request
//! after the window has expired opens a fresh window with a count of one.
//! Within a window, requests are admitted until the count reaches the limit.
//!
//! A fixed window admits up to twice the limit across a window boundary
//! (a full window's worth just before expiry, another just after). That is
//! accepted for a contact form.
//!
//! The table lives in process memory, so separate instances limit
//! independently. The intake pipeline only depends on [`RateLimitStore`],
//! which leaves room for a shared backend.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window expires
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Admission capability the intake pipeline depends on.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record a request for `key` and report whether it is admitted.
    async fn allow(&self, key: &str) -> RateLimitResult;

    /// Length of one rate limit window.
    fn window(&self) -> Duration;

    /// Drop state that can no longer affect a decision.
    async fn cleanup(&self) {}
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    /// `None` when the window reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl Window {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now <= at)
    }
}

/// In-memory fixed-window limiter keyed by client address.
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: RwLock<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window_duration(),
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Check `key` as of `now`.
    pub async fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let mut windows = self.windows.write().await;

        if let Some(w) = windows.get_mut(key).filter(|w| w.is_live(now)) {
            let reset_in = w
                .expires_at
                .map_or(self.window, |at| at.saturating_duration_since(now));
            if w.count >= self.max_requests {
                debug!(key, count = w.count, ?reset_in, "Rate limit exceeded");
                return RateLimitResult::Limited {
                    retry_after: reset_in,
                };
            }
            w.count += 1;
            return RateLimitResult::Allowed {
                remaining: self.max_requests - w.count,
                reset_in,
            };
        }

        // Absent or expired: start a fresh window
        windows.insert(
            key.to_string(),
            Window {
                count: 1,
                expires_at: now.checked_add(self.window),
            },
        );
        debug!(key, "Opened rate limit window");
        RateLimitResult::Allowed {
            remaining: self.max_requests.saturating_sub(1),
            reset_in: self.window,
        }
    }

    /// Remove windows that expired before `now`.
    pub async fn cleanup_at(&self, now: Instant) {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, w| w.is_live(now));
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Pruned expired rate limit windows");
        }
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[async_trait]
impl RateLimitStore for FixedWindowLimiter {
    async fn allow(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now()).await
    }

    fn window(&self) -> Duration {
        self.window
    }

    async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(&RateLimitConfig {
            max_requests,
            window_secs,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_sixth_request_in_window_is_limited() {
        let limiter = limiter(5, 900);
        let start = Instant::now();

        for i in 0..5 {
            let result = limiter.check_at("10.0.0.1", start + Duration::from_secs(i)).await;
            assert!(result.is_allowed(), "request {} should be allowed", i + 1);
        }

        match limiter.check_at("10.0.0.1", start + Duration::from_secs(10)).await {
            RateLimitResult::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(890));
            }
            RateLimitResult::Allowed { .. } => panic!("Should be limited"),
        }
    }

    #[tokio::test]
    async fn test_window_expiry_resets_counter() {
        let limiter = limiter(5, 900);
        let start = Instant::now();

        for _ in 0..6 {
            limiter.check_at("10.0.0.1", start).await;
        }

        // Still inside the window at exactly the expiry instant
        let at_expiry = start + Duration::from_secs(900);
        assert!(!limiter.check_at("10.0.0.1", at_expiry).await.is_allowed());

        let after = at_expiry + Duration::from_millis(1);
        assert_eq!(
            limiter.check_at("10.0.0.1", after).await,
            RateLimitResult::Allowed {
                remaining: 4,
                reset_in: Duration::from_secs(900),
            }
        );
        // Counter restarted at one, so four more fit
        for _ in 0..4 {
            assert!(limiter.check_at("10.0.0.1", after).await.is_allowed());
        }
        assert!(!limiter.check_at("10.0.0.1", after).await.is_allowed());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("a", now).await.is_allowed());
        assert!(!limiter.check_at("a", now).await.is_allowed());
        assert!(limiter.check_at("b", now).await.is_allowed());
    }

    #[tokio::test]
    async fn test_boundary_burst_is_admitted() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        let edge = start + Duration::from_secs(60);

        let mut admitted = 0;
        admitted += limiter.check_at("k", start).await.is_allowed() as u32;
        for _ in 0..4 {
            admitted += limiter.check_at("k", edge).await.is_allowed() as u32;
        }
        let past = edge + Duration::from_millis(1);
        for _ in 0..5 {
            admitted += limiter.check_at("k", past).await.is_allowed() as u32;
        }

        assert_eq!(admitted, 10);
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_windows() {
        let limiter = limiter(5, 60);
        let start = Instant::now();

        limiter.check_at("old", start).await;
        limiter.check_at("fresh", start + Duration::from_secs(30)).await;
        assert_eq!(limiter.tracked_keys().await, 2);

        limiter.cleanup_at(start + Duration::from_secs(61)).await;
        assert_eq!(limiter.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_never_expires() {
        let limiter = limiter(1, u64::MAX);
        let now = Instant::now();

        assert!(limiter.check_at("k", now).await.is_allowed());
        match limiter.check_at("k", now + Duration::from_secs(86_400)).await {
            RateLimitResult::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(u64::MAX));
            }
            RateLimitResult::Allowed { .. } => panic!("Should be limited"),
        }

        limiter.cleanup_at(now + Duration::from_secs(86_400)).await;
        assert_eq!(limiter.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_trait_object_allow() {
        let store: Box<dyn RateLimitStore> = Box::new(limiter(2, 60));
        assert!(store.allow("ip").await.is_allowed());
        assert!(store.allow("ip").await.is_allowed());
        assert!(!store.allow("ip").await.is_allowed());
        assert_eq!(store.window(), Duration::from_secs(60));
    }
}
