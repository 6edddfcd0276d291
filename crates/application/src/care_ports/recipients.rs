use async_trait::async_trait;
use attenthive_core::AppResult;
use attenthive_domain::{
    CareRecipient, MembershipRole, RecipientCategory, RecipientId, UserId,
};

/// Values for a recipient about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipient {
    /// Primary owner.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Recipient category.
    pub category: RecipientCategory,
    /// Optional subtype.
    pub subtype: Option<String>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Category-specific attributes object.
    pub attributes: serde_json::Value,
}

/// Partial update of editable recipient fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientChanges {
    /// New display name.
    pub name: Option<String>,
    /// New subtype; `Some(None)` clears it.
    pub subtype: Option<Option<String>>,
    /// New notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
    /// Replacement attributes object.
    pub attributes: Option<serde_json::Value>,
}

/// Owner of record plus the membership role of one user, read in one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipientAccessRow {
    /// Primary owner.
    pub owner_id: UserId,
    /// Role of the queried user's membership row, if one exists.
    pub membership_role: Option<MembershipRole>,
}

/// A recipient shared with a user, with the role that grants the share.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedRecipient {
    /// Shared recipient.
    pub recipient: CareRecipient,
    /// CAREGIVER or VIEWER.
    pub role: MembershipRole,
}

/// Repository port for care recipients.
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// Persists a new recipient.
    async fn create(&self, recipient: NewRecipient) -> AppResult<CareRecipient>;

    /// Finds a recipient by id.
    async fn find_by_id(&self, recipient_id: RecipientId) -> AppResult<Option<CareRecipient>>;

    /// Lists recipients whose primary owner is the user, oldest first.
    async fn list_owned_by(&self, owner_id: UserId) -> AppResult<Vec<CareRecipient>>;

    /// Applies changes and returns the updated recipient, or `None` if missing.
    async fn update(
        &self,
        recipient_id: RecipientId,
        changes: RecipientChanges,
    ) -> AppResult<Option<CareRecipient>>;

    /// Deletes a recipient with its memberships and care logs.
    async fn delete(&self, recipient_id: RecipientId) -> AppResult<bool>;

    /// Reads the owner of record and the user's membership role together.
    async fn find_access_row(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
    ) -> AppResult<Option<RecipientAccessRow>>;

    /// Lists recipients where the user holds a CAREGIVER or VIEWER membership.
    async fn list_shared_with(&self, user_id: UserId) -> AppResult<Vec<SharedRecipient>>;
}
