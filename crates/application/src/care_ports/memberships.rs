use async_trait::async_trait;
use attenthive_core::AppResult;
use attenthive_domain::{Membership, MembershipId, MembershipRole, RecipientId, UserId};

/// Membership row joined with the member's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDetail {
    /// Membership row.
    pub membership: Membership,
    /// Member display name.
    pub display_name: String,
    /// Member email.
    pub email: String,
}

/// Repository port for care circle memberships.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Lists all membership rows of a recipient.
    async fn list_for_recipient(&self, recipient_id: RecipientId) -> AppResult<Vec<Membership>>;

    /// Lists membership rows of a recipient joined with member profiles.
    async fn list_details_for_recipient(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<Vec<MemberDetail>>;

    /// Finds a membership row by id.
    async fn find_by_id(&self, membership_id: MembershipId) -> AppResult<Option<Membership>>;

    /// Creates the `(recipient, user)` row or updates its role if it exists.
    async fn upsert(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<Membership>;

    /// Deletes a membership row by id.
    async fn delete(&self, membership_id: MembershipId) -> AppResult<bool>;

    /// Deletes rows matching recipient, user, and role. Returns the count.
    async fn delete_matching(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<u64>;
}
