use attenthive_application::RecordCareInput;
use attenthive_core::{AppError, AppResult};
use attenthive_domain::CareLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{parse_single, timestamp};

/// Incoming payload for logging an activity.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/record-care-request.ts"
)]
pub struct RecordCareRequest {
    pub activity: String,
    #[serde(default)]
    #[ts(optional)]
    pub notes: Option<String>,
    /// RFC 3339 timestamp; defaults to now.
    #[serde(default)]
    #[ts(optional)]
    pub occurred_at: Option<String>,
}

impl TryFrom<RecordCareRequest> for RecordCareInput {
    type Error = AppError;

    fn try_from(request: RecordCareRequest) -> AppResult<Self> {
        let occurred_at = request
            .occurred_at
            .map(|value| parse_single("occurredAt", parse_timestamp(value.as_str())))
            .transpose()?;

        Ok(Self {
            activity: request.activity,
            notes: request.notes,
            occurred_at,
        })
    }
}

fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("'{value}' is not an RFC 3339 timestamp")))
}

/// Listing options.
#[derive(Debug, Deserialize)]
pub struct CareLogQuery {
    pub limit: Option<u32>,
}

/// API representation of a care log entry.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/care-log-response.ts"
)]
pub struct CareLogResponse {
    pub id: String,
    pub recipient_id: String,
    pub user_id: String,
    pub activity: String,
    pub notes: Option<String>,
    pub occurred_at: String,
    pub created_at: String,
}

impl From<CareLog> for CareLogResponse {
    fn from(entry: CareLog) -> Self {
        Self {
            id: entry.id.to_string(),
            recipient_id: entry.recipient_id.to_string(),
            user_id: entry.user_id.to_string(),
            activity: entry.activity.as_str().to_owned(),
            notes: entry.notes,
            occurred_at: timestamp(entry.occurred_at),
            created_at: timestamp(entry.created_at),
        }
    }
}
