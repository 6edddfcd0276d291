//! Care circle membership: invitations, removals, and listings.
//!
//! Every mutation loads the recipient's full membership snapshot and checks
//! the role predicates before touching storage.

use std::sync::Arc;

use attenthive_core::{AppError, AppResult};
use attenthive_domain::{
    AccessLevel, CareRecipient, MemberRole, MembershipId, MembershipRole, RecipientId,
    RecipientMembers, UserId,
};
use chrono::{DateTime, Utc};

use crate::{EmailService, MembershipRepository, RecipientRepository, UserRepository};

mod invite;
mod listing;
mod removal;


/// Input for inviting a user into a recipient's care circle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteMemberInput {
    /// Recipient to share.
    pub recipient_id: RecipientId,
    /// Email of an existing account.
    pub email: String,
    /// Requested role; CAREGIVER when omitted.
    pub role: Option<MembershipRole>,
}

/// One entry of a care circle listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircleMember {
    /// Membership row id; `None` for the primary owner.
    pub membership_id: Option<MembershipId>,
    /// Member user id.
    pub user_id: UserId,
    /// Member display name.
    pub display_name: String,
    /// Member email.
    pub email: String,
    /// Role as reported by access checks.
    pub role: MembershipRole,
    /// Effective access level.
    pub access: AccessLevel,
    /// Display label.
    pub label: &'static str,
    /// Whether the requesting user may remove this member.
    pub removable: bool,
    /// When the membership was granted; `None` for the primary owner.
    pub joined_at: Option<DateTime<Utc>>,
}

/// Care circle of one recipient as seen by one requesting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareCircle {
    /// The primary owner.
    pub owner: CircleMember,
    /// Membership rows, oldest first.
    pub members: Vec<CircleMember>,
}

/// Application service for care circle membership.
#[derive(Clone)]
pub struct MembershipService {
    recipient_repository: Arc<dyn RecipientRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    user_repository: Arc<dyn UserRepository>,
    email_service: Arc<dyn EmailService>,
    frontend_url: String,
}

impl MembershipService {
    /// Creates a new membership service.
    #[must_use]
    pub fn new(
        recipient_repository: Arc<dyn RecipientRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        user_repository: Arc<dyn UserRepository>,
        email_service: Arc<dyn EmailService>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            recipient_repository,
            membership_repository,
            user_repository,
            email_service,
            frontend_url: frontend_url.into(),
        }
    }

    /// Lists recipients shared with the user as CAREGIVER or VIEWER.
    ///
    /// Co-owner memberships are not listed here even though they grant access.
    pub async fn shared_recipients_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<crate::SharedRecipient>> {
        self.recipient_repository.list_shared_with(user_id).await
    }

    async fn load_snapshot(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<(CareRecipient, RecipientMembers)> {
        let recipient = self
            .recipient_repository
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipient '{recipient_id}' not found")))?;

        let members = self
            .membership_repository
            .list_for_recipient(recipient_id)
            .await?
            .into_iter()
            .map(|membership| MemberRole::new(membership.user_id, membership.role))
            .collect();

        let snapshot = RecipientMembers::new(recipient.owner_id, members);
        Ok((recipient, snapshot))
    }
}
