use std::str::FromStr;

use attenthive_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{RecipientId, UserId};

/// Unique identifier for a membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipId(Uuid);

impl MembershipId {
    /// Creates a new random membership identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a membership identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a membership identifier from its string form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid membership id '{value}': {error}"))
        })
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MembershipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MembershipId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role stored on a membership row.
///
/// `Owner` on a membership row means co-owner. The primary owner is the
/// recipient's `owner_id` and has no membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipRole {
    /// Co-owner with management rights.
    Owner,
    /// Read and write (activity logging) access.
    Caregiver,
    /// Read-only access.
    Viewer,
}

impl MembershipRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Caregiver => "CAREGIVER",
            Self::Viewer => "VIEWER",
        }
    }

    /// Returns whether the role grants write access.
    #[must_use]
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Owner | Self::Caregiver)
    }
}

impl FromStr for MembershipRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Self::Owner),
            "CAREGIVER" => Ok(Self::Caregiver),
            "VIEWER" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!(
                "unknown membership role '{value}'"
            ))),
        }
    }
}

/// A (recipient, user, role) row granting shared access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Unique membership identifier.
    pub id: MembershipId,
    /// Shared recipient.
    pub recipient_id: RecipientId,
    /// Member user.
    pub user_id: UserId,
    /// Granted role.
    pub role: MembershipRole,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last role change timestamp.
    pub updated_at: DateTime<Utc>,
}
