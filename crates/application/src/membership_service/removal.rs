use attenthive_domain::Membership;
use tracing::info;

use crate::Actor;

use super::*;

impl MembershipService {
    /// Removes a membership row, subject to the removal rules of the
    /// requesting user's role.
    pub async fn remove_member(
        &self,
        actor: &Actor,
        recipient_id: RecipientId,
        membership_id: MembershipId,
    ) -> AppResult<Membership> {
        let (_, snapshot) = self.load_snapshot(recipient_id).await?;
        if !snapshot.access_level(actor.id()).can_read() {
            return Err(AppError::Forbidden(format!(
                "user '{}' has no access to recipient '{recipient_id}'",
                actor.id()
            )));
        }

        let membership = self
            .membership_repository
            .find_by_id(membership_id)
            .await?
            .filter(|membership| membership.recipient_id == recipient_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "membership '{membership_id}' not found for recipient '{recipient_id}'"
                ))
            })?;

        if !snapshot.can_remove_member(actor.id(), membership.user_id) {
            return Err(AppError::Forbidden(format!(
                "user '{}' cannot remove member '{}'",
                actor.id(),
                membership.user_id
            )));
        }

        if !self.membership_repository.delete(membership_id).await? {
            return Err(AppError::NotFound(format!(
                "membership '{membership_id}' was already removed"
            )));
        }

        info!(
            recipient_id = %recipient_id,
            member_id = %membership.user_id,
            removed_by = %actor.id(),
            "removed care circle member"
        );

        Ok(membership)
    }

    /// Removes a caregiver membership. Primary owner only; never touches
    /// co-owner or viewer rows.
    pub async fn remove_caregiver(
        &self,
        actor: &Actor,
        recipient_id: RecipientId,
        target_user_id: UserId,
    ) -> AppResult<u64> {
        let recipient = self
            .recipient_repository
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipient '{recipient_id}' not found")))?;

        if recipient.owner_id != actor.id() {
            return Err(AppError::Forbidden(
                "only the primary owner can remove caregivers".to_owned(),
            ));
        }

        let removed = self
            .membership_repository
            .delete_matching(recipient_id, target_user_id, MembershipRole::Caregiver)
            .await?;

        info!(
            recipient_id = %recipient_id,
            member_id = %target_user_id,
            removed,
            "removed caregiver"
        );

        Ok(removed)
    }
}
