use std::str::FromStr;

use attenthive_application::{CareCircle, CircleMember, InviteMemberInput, SharedRecipient};
use attenthive_core::{AppError, AppResult, FieldViolation};
use attenthive_domain::{
    EmailAddress, Membership, MembershipId, MembershipRole, RecipientId, UserId,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{RecipientResponse, parse_field, timestamp};

/// Incoming payload for inviting a user into a care circle.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/invite-request.ts"
)]
pub struct InviteRequest {
    #[serde(default)]
    pub recipient_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[ts(optional)]
    pub role: Option<String>,
}

impl TryFrom<InviteRequest> for InviteMemberInput {
    type Error = AppError;

    fn try_from(request: InviteRequest) -> AppResult<Self> {
        let mut violations = Vec::new();

        let recipient_id = if request.recipient_id.trim().is_empty() {
            violations.push(FieldViolation::new("recipientId", "recipientId is required"));
            None
        } else {
            parse_field(
                &mut violations,
                "recipientId",
                RecipientId::parse(request.recipient_id.as_str()),
            )
        };
        let email = parse_field(&mut violations, "email", EmailAddress::new(request.email));
        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => Some(None),
            Some(role) => parse_field(&mut violations, "role", MembershipRole::from_str(role))
                .map(Some),
        };

        match (recipient_id, email, role) {
            (Some(recipient_id), Some(email), Some(role)) => Ok(Self {
                recipient_id,
                email: email.as_str().to_owned(),
                role,
            }),
            _ => Err(AppError::InvalidInput(violations)),
        }
    }
}

/// API representation of a membership row.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/membership-response.ts"
)]
pub struct MembershipResponse {
    pub id: String,
    pub recipient_id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Membership> for MembershipResponse {
    fn from(membership: Membership) -> Self {
        Self {
            id: membership.id.to_string(),
            recipient_id: membership.recipient_id.to_string(),
            user_id: membership.user_id.to_string(),
            role: membership.role.as_str().to_owned(),
            created_at: timestamp(membership.created_at),
            updated_at: timestamp(membership.updated_at),
        }
    }
}

/// Invite result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/invite-response.ts"
)]
pub struct InviteResponse {
    pub message: String,
    pub membership: MembershipResponse,
}

/// Query for listing a care circle.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersQuery {
    pub recipient_id: String,
}

/// One care circle entry with its display label.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-response.ts"
)]
pub struct MemberResponse {
    pub membership_id: Option<String>,
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub access: String,
    pub label: String,
    pub removable: bool,
    pub joined_at: Option<String>,
}

impl From<CircleMember> for MemberResponse {
    fn from(member: CircleMember) -> Self {
        Self {
            membership_id: member.membership_id.map(|id| id.to_string()),
            user_id: member.user_id.to_string(),
            display_name: member.display_name,
            email: member.email,
            role: member.role.as_str().to_owned(),
            access: member.access.as_str().to_owned(),
            label: member.label.to_owned(),
            removable: member.removable,
            joined_at: member.joined_at.map(timestamp),
        }
    }
}

/// Care circle listing. `count` excludes the primary owner.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/members-response.ts"
)]
pub struct MembersResponse {
    pub members: Vec<MemberResponse>,
    pub count: usize,
    pub owner: MemberResponse,
}

impl From<CareCircle> for MembersResponse {
    fn from(circle: CareCircle) -> Self {
        let members: Vec<MemberResponse> = circle
            .members
            .into_iter()
            .map(MemberResponse::from)
            .collect();
        Self {
            count: members.len(),
            members,
            owner: MemberResponse::from(circle.owner),
        }
    }
}

/// Incoming payload for removing any membership.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/remove-member-request.ts"
)]
pub struct RemoveMemberRequest {
    pub membership_id: String,
    pub recipient_id: String,
}

impl RemoveMemberRequest {
    pub fn parse(&self) -> AppResult<(RecipientId, MembershipId)> {
        let mut violations = Vec::new();
        let recipient_id = parse_field(
            &mut violations,
            "recipientId",
            RecipientId::parse(self.recipient_id.as_str()),
        );
        let membership_id = parse_field(
            &mut violations,
            "membershipId",
            MembershipId::parse(self.membership_id.as_str()),
        );

        match (recipient_id, membership_id) {
            (Some(recipient_id), Some(membership_id)) => Ok((recipient_id, membership_id)),
            _ => Err(AppError::InvalidInput(violations)),
        }
    }
}

/// Incoming payload for removing a caregiver by user id.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/remove-caregiver-request.ts"
)]
pub struct RemoveCaregiverRequest {
    pub recipient_id: String,
    pub user_id: String,
}

impl RemoveCaregiverRequest {
    pub fn parse(&self) -> AppResult<(RecipientId, UserId)> {
        let mut violations = Vec::new();
        let recipient_id = parse_field(
            &mut violations,
            "recipientId",
            RecipientId::parse(self.recipient_id.as_str()),
        );
        let user_id = parse_field(
            &mut violations,
            "userId",
            UserId::parse(self.user_id.as_str()),
        );

        match (recipient_id, user_id) {
            (Some(recipient_id), Some(user_id)) => Ok((recipient_id, user_id)),
            _ => Err(AppError::InvalidInput(violations)),
        }
    }
}

/// Caregiver removal result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/remove-caregiver-response.ts"
)]
pub struct RemoveCaregiverResponse {
    pub message: String,
    pub removed: u64,
}

/// A recipient shared with the caller, tagged with the caller's role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/shared-pet-response.ts"
)]
pub struct SharedPetResponse {
    pub recipient: RecipientResponse,
    pub role: String,
}

impl From<SharedRecipient> for SharedPetResponse {
    fn from(shared: SharedRecipient) -> Self {
        Self {
            recipient: RecipientResponse::from(shared.recipient),
            role: shared.role.as_str().to_owned(),
        }
    }
}

/// Recipients shared with the caller.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/shared-pets-response.ts"
)]
pub struct SharedPetsResponse {
    pub shared_pets: Vec<SharedPetResponse>,
    pub count: usize,
}
