//! Read-path access checks for care recipients.

use std::sync::Arc;

use attenthive_core::{AppError, AppResult};
use attenthive_domain::{AccessLevel, MembershipRole, RecipientId, UserId};

use crate::RecipientRepository;


/// Result of an access check. `role` is OWNER for both primary owners and
/// co-owners; compare against the owner of record to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipientAccess {
    /// Whether the user may read the recipient.
    pub can_access: bool,
    /// Effective role, if any.
    pub role: Option<MembershipRole>,
}

impl RecipientAccess {
    /// Access result for a missing recipient or an outsider.
    pub const DENIED: Self = Self {
        can_access: false,
        role: None,
    };
}

impl From<AccessLevel> for RecipientAccess {
    fn from(level: AccessLevel) -> Self {
        Self {
            can_access: level.can_read(),
            role: level.membership_role(),
        }
    }
}

/// Application service answering "may this user read/write this recipient".
#[derive(Clone)]
pub struct AccessService {
    recipient_repository: Arc<dyn RecipientRepository>,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(recipient_repository: Arc<dyn RecipientRepository>) -> Self {
        Self {
            recipient_repository,
        }
    }

    /// Resolves the access level, or `None` if the recipient does not exist.
    pub async fn access_level(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<Option<AccessLevel>> {
        let row = self
            .recipient_repository
            .find_access_row(recipient_id, user_id)
            .await?;

        Ok(row.map(|row| AccessLevel::resolve(row.owner_id, user_id, row.membership_role)))
    }

    /// Returns whether the user can read the recipient and with which role.
    pub async fn can_access_recipient(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<RecipientAccess> {
        Ok(self
            .access_level(user_id, recipient_id)
            .await?
            .map_or(RecipientAccess::DENIED, RecipientAccess::from))
    }

    /// Returns whether the user may mutate the recipient's data. Viewers and
    /// outsiders never may.
    pub async fn can_write_to_recipient(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<bool> {
        let access = self.can_access_recipient(user_id, recipient_id).await?;

        Ok(access.can_access && access.role.is_some_and(|role| role.can_write()))
    }

    /// Requires read access, distinguishing a missing recipient from a denial.
    pub async fn require_read(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<AccessLevel> {
        let level = self.require_existing(user_id, recipient_id).await?;
        if !level.can_read() {
            return Err(AppError::Forbidden(format!(
                "user '{user_id}' has no access to recipient '{recipient_id}'"
            )));
        }

        Ok(level)
    }

    /// Requires write access, distinguishing a missing recipient from a denial.
    pub async fn require_write(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<AccessLevel> {
        let level = self.require_existing(user_id, recipient_id).await?;
        if !RecipientAccess::from(level)
            .role
            .is_some_and(|role| role.can_write())
        {
            return Err(AppError::Forbidden(format!(
                "user '{user_id}' cannot modify recipient '{recipient_id}'"
            )));
        }

        Ok(level)
    }

    async fn require_existing(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<AccessLevel> {
        self.access_level(user_id, recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipient '{recipient_id}' not found")))
    }
}
