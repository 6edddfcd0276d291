//! PostgreSQL-backed care recipient repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use attenthive_application::{
    NewRecipient, RecipientAccessRow, RecipientChanges, RecipientRepository, SharedRecipient,
};
use attenthive_core::{AppError, AppResult};
use attenthive_domain::{CareRecipient, MembershipRole, RecipientCategory, RecipientId, UserId};

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the recipient repository port.
#[derive(Clone)]
pub struct PostgresRecipientRepository {
    pool: PgPool,
}

impl PostgresRecipientRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecipientRow {
    id: uuid::Uuid,
    owner_id: uuid::Uuid,
    name: String,
    category: String,
    subtype: Option<String>,
    notes: Option<String>,
    attributes: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecipientRow> for CareRecipient {
    type Error = AppError;

    fn try_from(row: RecipientRow) -> Result<Self, Self::Error> {
        let category = RecipientCategory::from_str(row.category.as_str()).map_err(|error| {
            AppError::Internal(format!("recipient '{}' has bad category: {error}", row.id))
        })?;

        Ok(Self {
            id: RecipientId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            name: row.name,
            category,
            subtype: row.subtype,
            notes: row.notes,
            attributes: row.attributes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SharedRow {
    #[sqlx(flatten)]
    recipient: RecipientRow,
    role: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AccessRow {
    owner_id: uuid::Uuid,
    membership_role: Option<String>,
}

pub(crate) fn parse_role(value: &str) -> AppResult<MembershipRole> {
    MembershipRole::from_str(value)
        .map_err(|error| AppError::Internal(format!("stored membership role is invalid: {error}")))
}

#[async_trait]
impl RecipientRepository for PostgresRecipientRepository {
    async fn create(&self, recipient: NewRecipient) -> AppResult<CareRecipient> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            INSERT INTO care_recipients (id, owner_id, name, category, subtype, notes, attributes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, name, category, subtype, notes, attributes, created_at, updated_at
            "#,
        )
        .bind(RecipientId::new().as_uuid())
        .bind(recipient.owner_id.as_uuid())
        .bind(recipient.name.as_str())
        .bind(recipient.category.as_str())
        .bind(recipient.subtype.as_deref())
        .bind(recipient.notes.as_deref())
        .bind(&recipient.attributes)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create recipient: {error}")))?;

        CareRecipient::try_from(row)
    }

    async fn find_by_id(&self, recipient_id: RecipientId) -> AppResult<Option<CareRecipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, owner_id, name, category, subtype, notes, attributes, created_at, updated_at
            FROM care_recipients
            WHERE id = $1
            "#,
        )
        .bind(recipient_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find recipient: {error}")))?;

        row.map(CareRecipient::try_from).transpose()
    }

    async fn list_owned_by(&self, owner_id: UserId) -> AppResult<Vec<CareRecipient>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, owner_id, name, category, subtype, notes, attributes, created_at, updated_at
            FROM care_recipients
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list owned recipients: {error}"))
        })?;

        rows.into_iter().map(CareRecipient::try_from).collect()
    }

    async fn update(
        &self,
        recipient_id: RecipientId,
        changes: RecipientChanges,
    ) -> AppResult<Option<CareRecipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            UPDATE care_recipients
            SET
                name = COALESCE($2, name),
                subtype = CASE WHEN $3 THEN $4 ELSE subtype END,
                notes = CASE WHEN $5 THEN $6 ELSE notes END,
                attributes = COALESCE($7, attributes),
                updated_at = now()
            WHERE id = $1
            RETURNING id, owner_id, name, category, subtype, notes, attributes, created_at, updated_at
            "#,
        )
        .bind(recipient_id.as_uuid())
        .bind(changes.name.as_deref())
        .bind(changes.subtype.is_some())
        .bind(changes.subtype.flatten())
        .bind(changes.notes.is_some())
        .bind(changes.notes.flatten())
        .bind(changes.attributes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update recipient: {error}")))?;

        row.map(CareRecipient::try_from).transpose()
    }

    async fn delete(&self, recipient_id: RecipientId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM care_recipients
            WHERE id = $1
            "#,
        )
        .bind(recipient_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete recipient: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_access_row(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
    ) -> AppResult<Option<RecipientAccessRow>> {
        let row = sqlx::query_as::<_, AccessRow>(
            r#"
            SELECT recipient.owner_id, membership.role AS membership_role
            FROM care_recipients recipient
            LEFT JOIN memberships membership
                ON membership.recipient_id = recipient.id
               AND membership.user_id = $2
            WHERE recipient.id = $1
            "#,
        )
        .bind(recipient_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check recipient access: {error}")))?;

        row.map(|row| {
            Ok(RecipientAccessRow {
                owner_id: UserId::from_uuid(row.owner_id),
                membership_role: row.membership_role.as_deref().map(parse_role).transpose()?,
            })
        })
        .transpose()
    }

    async fn list_shared_with(&self, user_id: UserId) -> AppResult<Vec<SharedRecipient>> {
        let rows = sqlx::query_as::<_, SharedRow>(
            r#"
            SELECT
                recipient.id, recipient.owner_id, recipient.name, recipient.category,
                recipient.subtype, recipient.notes, recipient.attributes,
                recipient.created_at, recipient.updated_at,
                membership.role
            FROM memberships membership
            INNER JOIN care_recipients recipient ON recipient.id = membership.recipient_id
            WHERE membership.user_id = $1
              AND membership.role IN ('CAREGIVER', 'VIEWER')
            ORDER BY membership.created_at, recipient.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list shared recipients: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(SharedRecipient {
                    role: parse_role(row.role.as_str())?,
                    recipient: CareRecipient::try_from(row.recipient)?,
                })
            })
            .collect()
    }
}
