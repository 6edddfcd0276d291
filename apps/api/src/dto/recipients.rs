use attenthive_application::{AccessSummary, CreateRecipientInput, UpdateRecipientInput};
use attenthive_domain::CareRecipient;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::timestamp;

/// Incoming payload for creating a care recipient.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-recipient-request.ts"
)]
pub struct CreateRecipientRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    #[ts(optional)]
    pub subtype: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub notes: Option<String>,
    #[serde(default)]
    #[ts(optional, type = "Record<string, unknown>")]
    pub attributes: Option<serde_json::Value>,
}

impl From<CreateRecipientRequest> for CreateRecipientInput {
    fn from(request: CreateRecipientRequest) -> Self {
        Self {
            name: request.name,
            category: request.category,
            subtype: request.subtype,
            notes: request.notes,
            attributes: request.attributes,
        }
    }
}

/// Partial update. Omitted fields are left alone; an empty string clears
/// `subtype` or `notes`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-recipient-request.ts"
)]
pub struct UpdateRecipientRequest {
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub subtype: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub notes: Option<String>,
    #[serde(default)]
    #[ts(optional, type = "Record<string, unknown>")]
    pub attributes: Option<serde_json::Value>,
}

impl From<UpdateRecipientRequest> for UpdateRecipientInput {
    fn from(request: UpdateRecipientRequest) -> Self {
        Self {
            name: request.name,
            subtype: request.subtype,
            notes: request.notes,
            attributes: request.attributes,
        }
    }
}

/// API representation of a care recipient.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/recipient-response.ts"
)]
pub struct RecipientResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub category: String,
    pub subtype: Option<String>,
    pub notes: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    pub attributes: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CareRecipient> for RecipientResponse {
    fn from(recipient: CareRecipient) -> Self {
        Self {
            id: recipient.id.to_string(),
            owner_id: recipient.owner_id.to_string(),
            name: recipient.name,
            category: recipient.category.as_str().to_owned(),
            subtype: recipient.subtype,
            notes: recipient.notes,
            attributes: recipient.attributes,
            created_at: timestamp(recipient.created_at),
            updated_at: timestamp(recipient.updated_at),
        }
    }
}

/// The caller's effective access to one recipient.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-summary-response.ts"
)]
pub struct AccessSummaryResponse {
    pub recipient_id: String,
    pub can_access: bool,
    pub role: Option<String>,
    pub access: String,
    pub label: String,
    pub can_write: bool,
    pub can_manage: bool,
}

impl From<AccessSummary> for AccessSummaryResponse {
    fn from(summary: AccessSummary) -> Self {
        Self {
            recipient_id: summary.recipient_id.to_string(),
            can_access: summary.access.can_read(),
            role: summary
                .access
                .membership_role()
                .map(|role| role.as_str().to_owned()),
            access: summary.access.as_str().to_owned(),
            label: summary.label.to_owned(),
            can_write: summary.can_write,
            can_manage: summary.can_manage,
        }
    }
}
