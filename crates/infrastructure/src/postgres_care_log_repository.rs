//! PostgreSQL-backed care log repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use attenthive_application::{CareLogRepository, NewCareLog};
use attenthive_core::{AppError, AppResult};
use attenthive_domain::{CareActivity, CareLog, CareLogId, RecipientId, UserId};

/// PostgreSQL implementation of the care log repository port.
#[derive(Clone)]
pub struct PostgresCareLogRepository {
    pool: PgPool,
}

impl PostgresCareLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CareLogRow {
    id: uuid::Uuid,
    recipient_id: uuid::Uuid,
    user_id: uuid::Uuid,
    activity: String,
    notes: Option<String>,
    occurred_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CareLogRow> for CareLog {
    type Error = AppError;

    fn try_from(row: CareLogRow) -> Result<Self, Self::Error> {
        let activity = CareActivity::from_str(row.activity.as_str()).map_err(|error| {
            AppError::Internal(format!("care log '{}' has bad activity: {error}", row.id))
        })?;

        Ok(Self {
            id: CareLogId::from_uuid(row.id),
            recipient_id: RecipientId::from_uuid(row.recipient_id),
            user_id: UserId::from_uuid(row.user_id),
            activity,
            notes: row.notes,
            occurred_at: row.occurred_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CareLogRepository for PostgresCareLogRepository {
    async fn create(&self, entry: NewCareLog) -> AppResult<CareLog> {
        let row = sqlx::query_as::<_, CareLogRow>(
            r#"
            INSERT INTO care_logs (id, recipient_id, user_id, activity, notes, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, recipient_id, user_id, activity, notes, occurred_at, created_at
            "#,
        )
        .bind(CareLogId::new().as_uuid())
        .bind(entry.recipient_id.as_uuid())
        .bind(entry.user_id.as_uuid())
        .bind(entry.activity.as_str())
        .bind(entry.notes.as_deref())
        .bind(entry.occurred_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record care log: {error}")))?;

        CareLog::try_from(row)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        limit: u32,
    ) -> AppResult<Vec<CareLog>> {
        let rows = sqlx::query_as::<_, CareLogRow>(
            r#"
            SELECT id, recipient_id, user_id, activity, notes, occurred_at, created_at
            FROM care_logs
            WHERE recipient_id = $1
            ORDER BY occurred_at DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(recipient_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list care logs: {error}")))?;

        rows.into_iter().map(CareLog::try_from).collect()
    }

    async fn find_by_id(&self, care_log_id: CareLogId) -> AppResult<Option<CareLog>> {
        let row = sqlx::query_as::<_, CareLogRow>(
            r#"
            SELECT id, recipient_id, user_id, activity, notes, occurred_at, created_at
            FROM care_logs
            WHERE id = $1
            "#,
        )
        .bind(care_log_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find care log: {error}")))?;

        row.map(CareLog::try_from).transpose()
    }

    async fn delete(&self, care_log_id: CareLogId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM care_logs
            WHERE id = $1
            "#,
        )
        .bind(care_log_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete care log: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
