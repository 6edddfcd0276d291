//! Application services and ports.

#![forbid(unsafe_code)]

mod access_service;
mod actor;
mod care_log_service;
mod care_ports;
mod membership_service;
mod notification_ports;
mod rate_limit_service;
mod recipient_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use access_service::{AccessService, RecipientAccess};
pub use actor::{Actor, ActorResolver};
pub use care_log_service::{
    CareLogService, DEFAULT_CARE_LOG_LIMIT, MAX_CARE_LOG_LIMIT, RecordCareInput,
};
pub use care_ports::{
    CareLogRepository, MemberDetail, MembershipRepository, NewCareLog, NewRecipient,
    RecipientAccessRow, RecipientChanges, RecipientRepository, SharedRecipient,
};
pub use membership_service::{CareCircle, CircleMember, InviteMemberInput, MembershipService};
pub use notification_ports::EmailService;
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
pub use recipient_service::{
    AccessSummary, CreateRecipientInput, RECIPIENT_NAME_MAX_LENGTH, RECIPIENT_NOTES_MAX_LENGTH,
    RECIPIENT_SUBTYPE_MAX_LENGTH, RecipientService, UpdateRecipientInput,
};
pub use user_service::{
    AuthOutcome, NewUser, PasswordHasher, RegisterParams, UserRecord, UserRepository, UserService,
};
