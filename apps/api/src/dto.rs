//! Request and response payloads. Field names are camelCase on the wire and
//! TypeScript bindings are exported for the frontend.

mod auth;
mod care_logs;
mod common;
mod members;
mod recipients;

pub use auth::{BootstrapRequest, LoginRequest, RegisterRequest};
pub use care_logs::{CareLogQuery, CareLogResponse, RecordCareRequest};
pub use common::{HealthResponse, MessageResponse, UserResponse};
pub use members::{
    InviteRequest, InviteResponse, MembersQuery, MembersResponse, MembershipResponse,
    RemoveCaregiverRequest, RemoveCaregiverResponse, RemoveMemberRequest, SharedPetResponse,
    SharedPetsResponse,
};
pub use recipients::{
    AccessSummaryResponse, CreateRecipientRequest, RecipientResponse, UpdateRecipientRequest,
};

use attenthive_core::{AppError, AppResult, FieldViolation};
use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp the way every response carries it.
pub(crate) fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses one request field, recording a violation for it on failure.
pub(crate) fn parse_field<T>(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    result: AppResult<T>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(AppError::Validation(message)) => {
            violations.push(FieldViolation::new(field, message));
            None
        }
        Err(other) => {
            violations.push(FieldViolation::new(field, other.to_string()));
            None
        }
    }
}

/// Parses a single identifier outside of a larger payload.
pub(crate) fn parse_single<T>(field: &str, result: AppResult<T>) -> AppResult<T> {
    let mut violations = Vec::new();
    parse_field(&mut violations, field, result).ok_or(AppError::InvalidInput(violations))
}
