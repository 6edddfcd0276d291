//! Fixed-window request throttling for login, registration, and invites.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use attenthive_core::{AppError, AppResult};
use tracing::warn;

/// Repository port for attempt counters.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Counts one attempt for `key`, starting a new window when the previous
    /// one is older than `window_duration_seconds`.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Deletes counters whose window started before `before`.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Counter state after recording an attempt.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Attempts in the active window, this one included.
    pub attempt_count: i32,
    /// Start of the active window.
    pub window_started_at: DateTime<Utc>,
}

/// Throttling rule for one category of requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Key prefix, e.g. `login`.
    pub category: &'static str,
    /// Attempts allowed per window.
    pub max_attempts: i32,
    /// Window length in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Password logins per client address.
    pub const LOGIN: Self = Self::new("login", 10, 15 * 60);
    /// Account registrations per client address.
    pub const REGISTER: Self = Self::new("register", 5, 60 * 60);
    /// Care circle invitations per acting user.
    pub const INVITE: Self = Self::new("invite", 30, 60 * 60);

    /// Creates a rule.
    #[must_use]
    pub const fn new(category: &'static str, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category,
            max_attempts,
            window_seconds,
        }
    }
}

/// Application service enforcing [`RateLimitRule`]s.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Records an attempt and fails with `RateLimited` once the rule's
    /// budget for `identifier` is spent.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, identifier: &str) -> AppResult<()> {
        let key = format!("{}:{identifier}", rule.category);
        let info = self
            .repository
            .record_attempt(&key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            warn!(
                category = rule.category,
                attempts = info.attempt_count,
                window_started_at = %info.window_started_at,
                "rate limit exceeded"
            );
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Drops counters older than a day.
    pub async fn cleanup(&self) -> AppResult<u64> {
        self.repository
            .cleanup_expired(Utc::now() - Duration::hours(24))
            .await
    }
}
