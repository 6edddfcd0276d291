use attenthive_domain::{EmailAddress, Membership};
use tracing::{info, warn};

use crate::Actor;

use super::*;

impl MembershipService {
    /// Invites an existing user into a recipient's care circle.
    ///
    /// Re-inviting an existing member updates their role in place, so the
    /// operation is idempotent and doubles as the role-change path.
    pub async fn invite_member(
        &self,
        actor: &Actor,
        input: InviteMemberInput,
    ) -> AppResult<Membership> {
        let invitee_email = EmailAddress::new(input.email.as_str())?;
        let role = input.role.unwrap_or(MembershipRole::Caregiver);

        let (recipient, snapshot) = self.load_snapshot(input.recipient_id).await?;

        if !snapshot.can_invite_members(actor.id()) {
            return Err(AppError::Forbidden(format!(
                "only owners can invite members to recipient '{}'",
                recipient.id
            )));
        }

        if role == MembershipRole::Owner && !snapshot.is_primary_owner(actor.id()) {
            return Err(AppError::Forbidden(
                "only the primary owner can invite co-owners".to_owned(),
            ));
        }

        if &invitee_email == actor.email() {
            return Err(AppError::Validation("you cannot invite yourself".to_owned()));
        }

        let invitee = self
            .user_repository
            .find_by_email(invitee_email.as_str())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("no account exists for '{invitee_email}'"))
            })?;

        if snapshot.is_primary_owner(invitee.id) {
            return Err(AppError::Conflict(format!(
                "'{invitee_email}' is already the owner of this recipient"
            )));
        }

        let membership = self
            .membership_repository
            .upsert(recipient.id, invitee.id, role)
            .await?;

        info!(
            recipient_id = %recipient.id,
            member_id = %invitee.id,
            role = role.as_str(),
            invited_by = %actor.id(),
            "granted care circle membership"
        );

        self.notify_invitee(actor, &recipient, invitee_email.as_str(), role)
            .await;

        Ok(membership)
    }

    async fn notify_invitee(
        &self,
        actor: &Actor,
        recipient: &CareRecipient,
        invitee_email: &str,
        role: MembershipRole,
    ) {
        let role_name = match role {
            MembershipRole::Owner => "co-owner",
            MembershipRole::Caregiver => "caregiver",
            MembershipRole::Viewer => "viewer",
        };
        let subject = format!("You have joined {}'s care circle", recipient.name);
        let link = format!(
            "{}/recipients/{}",
            self.frontend_url.trim_end_matches('/'),
            recipient.id
        );
        let text_body = format!(
            "{} added you to the care circle for {} as a {role_name}.\n\nOpen AttentHive: {link}\n",
            actor.display_name(),
            recipient.name,
        );

        if let Err(error) = self
            .email_service
            .send_email(invitee_email, &subject, &text_body, None)
            .await
        {
            warn!(
                recipient_id = %recipient.id,
                error = %error,
                "failed to send care circle invitation email"
            );
        }
    }
}
