//! PostgreSQL-backed membership repository.
//!
//! Memberships are unique per `(recipient_id, user_id)`; `upsert` relies on
//! that constraint so concurrent invites settle on the last written role.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use attenthive_application::{MemberDetail, MembershipRepository};
use attenthive_core::{AppError, AppResult};
use attenthive_domain::{Membership, MembershipId, MembershipRole, RecipientId, UserId};

use crate::postgres_recipient_repository::parse_role;

/// PostgreSQL implementation of the membership repository port.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: uuid::Uuid,
    recipient_id: uuid::Uuid,
    user_id: uuid::Uuid,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MembershipId::from_uuid(row.id),
            recipient_id: RecipientId::from_uuid(row.recipient_id),
            user_id: UserId::from_uuid(row.user_id),
            role: parse_role(row.role.as_str())?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberDetailRow {
    #[sqlx(flatten)]
    membership: MembershipRow,
    display_name: String,
    email: String,
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn list_for_recipient(&self, recipient_id: RecipientId) -> AppResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, recipient_id, user_id, role, created_at, updated_at
            FROM memberships
            WHERE recipient_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(recipient_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list memberships: {error}")))?;

        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn list_details_for_recipient(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<Vec<MemberDetail>> {
        let rows = sqlx::query_as::<_, MemberDetailRow>(
            r#"
            SELECT
                membership.id, membership.recipient_id, membership.user_id, membership.role,
                membership.created_at, membership.updated_at,
                account.display_name, account.email
            FROM memberships membership
            INNER JOIN users account ON account.id = membership.user_id
            WHERE membership.recipient_id = $1
            ORDER BY membership.created_at, membership.id
            "#,
        )
        .bind(recipient_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list member details: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(MemberDetail {
                    membership: Membership::try_from(row.membership)?,
                    display_name: row.display_name,
                    email: row.email,
                })
            })
            .collect()
    }

    async fn find_by_id(&self, membership_id: MembershipId) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, recipient_id, user_id, role, created_at, updated_at
            FROM memberships
            WHERE id = $1
            "#,
        )
        .bind(membership_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find membership: {error}")))?;

        row.map(Membership::try_from).transpose()
    }

    async fn upsert(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<Membership> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO memberships (id, recipient_id, user_id, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (recipient_id, user_id) DO UPDATE
            SET role = EXCLUDED.role,
                updated_at = now()
            RETURNING id, recipient_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(MembershipId::new().as_uuid())
        .bind(recipient_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::NotFound(format!(
                    "recipient '{recipient_id}' or user '{user_id}' does not exist"
                ));
            }

            AppError::Internal(format!("failed to upsert membership: {error}"))
        })?;

        Membership::try_from(row)
    }

    async fn delete(&self, membership_id: MembershipId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM memberships
            WHERE id = $1
            "#,
        )
        .bind(membership_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete membership: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_matching(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM memberships
            WHERE recipient_id = $1 AND user_id = $2 AND role = $3
            "#,
        )
        .bind(recipient_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete memberships: {error}")))?;

        Ok(result.rows_affected())
    }
}
