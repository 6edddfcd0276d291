//! Fixed-window attempt counters in the `rate_limit_windows` table.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use attenthive_application::{AttemptInfo, RateLimitRepository};
use attenthive_core::{AppError, AppResult};

/// PostgreSQL implementation of the rate limit repository port.
///
/// One row per key; a window that has run out is restarted in the same
/// statement that counts the attempt.
#[derive(Clone)]
pub struct PostgresRateLimitRepository {
    pool: PgPool,
}

impl PostgresRateLimitRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateLimitRepository for PostgresRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let now = Utc::now();
        let window_floor = now - Duration::seconds(window_duration_seconds);

        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            INSERT INTO rate_limit_windows AS w (key, window_started_at, attempt_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (key) DO UPDATE
            SET
                attempt_count = CASE WHEN w.window_started_at < $3 THEN 1 ELSE w.attempt_count + 1 END,
                window_started_at = CASE WHEN w.window_started_at < $3 THEN $2 ELSE w.window_started_at END
            RETURNING attempt_count, window_started_at
            "#,
        )
        .bind(key)
        .bind(now)
        .bind(window_floor)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count attempt: {error}"))
        })?;

        Ok(AttemptInfo {
            attempt_count: row.attempt_count,
            window_started_at: row.window_started_at,
        })
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM rate_limit_windows
            WHERE window_started_at < $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to purge rate limit windows: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    attempt_count: i32,
    window_started_at: DateTime<Utc>,
}
