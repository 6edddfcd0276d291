use crate::Actor;

use super::*;

impl MembershipService {
    /// Lists the primary owner and every member of a recipient's care circle.
    pub async fn list_members(
        &self,
        actor: &Actor,
        recipient_id: RecipientId,
    ) -> AppResult<CareCircle> {
        let (recipient, snapshot) = self.load_snapshot(recipient_id).await?;

        if !snapshot.access_level(actor.id()).can_read() {
            return Err(AppError::Forbidden(format!(
                "user '{}' has no access to recipient '{recipient_id}'",
                actor.id()
            )));
        }

        let owner_record = self
            .user_repository
            .find_by_id(recipient.owner_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "owner '{}' of recipient '{recipient_id}' is missing",
                    recipient.owner_id
                ))
            })?;

        let owner = CircleMember {
            membership_id: None,
            user_id: owner_record.id,
            display_name: owner_record.display_name,
            email: owner_record.email,
            role: MembershipRole::Owner,
            access: AccessLevel::PrimaryOwner,
            label: snapshot.member_role_label(owner_record.id),
            removable: false,
            joined_at: None,
        };

        let mut details = self
            .membership_repository
            .list_details_for_recipient(recipient_id)
            .await?;
        details.sort_by_key(|detail| detail.membership.created_at);

        let members = details
            .into_iter()
            .map(|detail| {
                let user_id = detail.membership.user_id;
                CircleMember {
                    membership_id: Some(detail.membership.id),
                    user_id,
                    display_name: detail.display_name,
                    email: detail.email,
                    role: detail.membership.role,
                    access: snapshot.access_level(user_id),
                    label: snapshot.member_role_label(user_id),
                    removable: snapshot.can_remove_member(actor.id(), user_id),
                    joined_at: Some(detail.membership.created_at),
                }
            })
            .collect();

        Ok(CareCircle { owner, members })
    }
}
