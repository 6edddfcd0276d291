//! Role predicates over a recipient's ownership and membership snapshot.
//!
//! Every predicate is total: an empty member list only ever lets the
//! primary-owner checks succeed.

use serde::{Deserialize, Serialize};

use crate::{MembershipRole, UserId};

/// Display label for a primary owner.
pub const PRIMARY_OWNER_LABEL: &str = "Owner";
/// Display label for a co-owner.
pub const CO_OWNER_LABEL: &str = "Co-owner";
/// Display label for everyone else, viewers and outsiders included.
pub const CAREGIVER_LABEL: &str = "Caregiver";

/// One member entry of a recipient snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRole {
    /// Member user.
    pub user_id: UserId,
    /// Role held by the member.
    pub role: MembershipRole,
}

impl MemberRole {
    /// Creates a member entry.
    #[must_use]
    pub fn new(user_id: UserId, role: MembershipRole) -> Self {
        Self { user_id, role }
    }
}

/// Ownership and membership of one recipient, as seen by permission checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientMembers {
    owner_id: UserId,
    members: Vec<MemberRole>,
}

impl RecipientMembers {
    /// Creates a snapshot from the primary owner and membership entries.
    #[must_use]
    pub fn new(owner_id: UserId, members: Vec<MemberRole>) -> Self {
        Self { owner_id, members }
    }

    /// Creates a snapshot with no membership rows.
    #[must_use]
    pub fn owner_only(owner_id: UserId) -> Self {
        Self::new(owner_id, Vec::new())
    }

    /// Returns the primary owner.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the membership entries.
    #[must_use]
    pub fn members(&self) -> &[MemberRole] {
        &self.members
    }

    /// Returns the membership role held by a user, if any.
    #[must_use]
    pub fn member_role(&self, user_id: UserId) -> Option<MembershipRole> {
        self.members
            .iter()
            .find(|member| member.user_id == user_id)
            .map(|member| member.role)
    }

    fn has_member_role(&self, user_id: UserId, role: MembershipRole) -> bool {
        self.members
            .iter()
            .any(|member| member.user_id == user_id && member.role == role)
    }

    /// Returns whether the user is the recipient's primary owner.
    #[must_use]
    pub fn is_primary_owner(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Returns whether the user holds an OWNER membership and is not the
    /// primary owner.
    #[must_use]
    pub fn is_co_owner(&self, user_id: UserId) -> bool {
        !self.is_primary_owner(user_id) && self.has_member_role(user_id, MembershipRole::Owner)
    }

    /// Returns whether the user is the primary owner or a co-owner.
    #[must_use]
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.is_primary_owner(user_id) || self.is_co_owner(user_id)
    }

    /// Returns whether the user may edit the recipient's details.
    #[must_use]
    pub fn can_edit_pet(&self, user_id: UserId) -> bool {
        self.is_owner(user_id)
    }

    /// Returns whether the user may invite members.
    #[must_use]
    pub fn can_invite_members(&self, user_id: UserId) -> bool {
        self.is_owner(user_id)
    }

    /// Returns whether `acting` may remove `target` from the care circle.
    ///
    /// The primary owner can remove anyone but themselves. A co-owner can
    /// only remove caregivers. Nobody can remove the primary owner.
    #[must_use]
    pub fn can_remove_member(&self, acting: UserId, target: UserId) -> bool {
        if self.is_primary_owner(target) || !self.is_owner(acting) {
            return false;
        }

        if self.is_primary_owner(acting) {
            return acting != target;
        }

        self.has_member_role(target, MembershipRole::Caregiver)
    }

    /// Returns the label shown next to a user in membership lists.
    ///
    /// Viewers and outsiders both fall back to the caregiver label.
    #[must_use]
    pub fn member_role_label(&self, user_id: UserId) -> &'static str {
        if self.is_primary_owner(user_id) {
            PRIMARY_OWNER_LABEL
        } else if self.has_member_role(user_id, MembershipRole::Owner) {
            CO_OWNER_LABEL
        } else {
            CAREGIVER_LABEL
        }
    }

    /// Resolves the effective access level of a user.
    #[must_use]
    pub fn access_level(&self, user_id: UserId) -> AccessLevel {
        AccessLevel::resolve(self.owner_id, user_id, self.member_role(user_id))
    }
}

/// Effective relation of one user to one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// The recipient's owner of record.
    PrimaryOwner,
    /// Member with role OWNER.
    CoOwner,
    /// Member with role CAREGIVER.
    Caregiver,
    /// Member with role VIEWER.
    Viewer,
    /// Neither owner nor member.
    NoAccess,
}

impl AccessLevel {
    /// Resolves the level from the owner of record and an optional membership role.
    #[must_use]
    pub fn resolve(
        owner_id: UserId,
        user_id: UserId,
        membership_role: Option<MembershipRole>,
    ) -> Self {
        if owner_id == user_id {
            return Self::PrimaryOwner;
        }

        match membership_role {
            Some(MembershipRole::Owner) => Self::CoOwner,
            Some(MembershipRole::Caregiver) => Self::Caregiver,
            Some(MembershipRole::Viewer) => Self::Viewer,
            None => Self::NoAccess,
        }
    }

    /// Returns whether the user may read the recipient and its activity.
    #[must_use]
    pub fn can_read(&self) -> bool {
        !matches!(self, Self::NoAccess)
    }

    /// Returns whether the user may log activity and mutate recipient data.
    #[must_use]
    pub fn can_write(&self) -> bool {
        matches!(self, Self::PrimaryOwner | Self::CoOwner | Self::Caregiver)
    }

    /// Returns whether the user is the primary owner or a co-owner.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::PrimaryOwner | Self::CoOwner)
    }

    /// Returns whether the user may invite members into the care circle.
    #[must_use]
    pub fn can_manage_members(&self) -> bool {
        self.is_owner()
    }

    /// Returns the role reported by access checks. The primary owner reports
    /// as OWNER, exactly like a co-owner.
    #[must_use]
    pub fn membership_role(&self) -> Option<MembershipRole> {
        match self {
            Self::PrimaryOwner | Self::CoOwner => Some(MembershipRole::Owner),
            Self::Caregiver => Some(MembershipRole::Caregiver),
            Self::Viewer => Some(MembershipRole::Viewer),
            Self::NoAccess => None,
        }
    }

    /// Returns the display label, matching [`RecipientMembers::member_role_label`].
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::PrimaryOwner => PRIMARY_OWNER_LABEL,
            Self::CoOwner => CO_OWNER_LABEL,
            Self::Caregiver | Self::Viewer | Self::NoAccess => CAREGIVER_LABEL,
        }
    }

    /// Returns a stable transport value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryOwner => "primary_owner",
            Self::CoOwner => "co_owner",
            Self::Caregiver => "caregiver",
            Self::Viewer => "viewer",
            Self::NoAccess => "no_access",
        }
    }
}
