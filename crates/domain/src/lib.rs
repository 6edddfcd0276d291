//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod care_log;
mod membership;
mod recipient;
mod user;

pub use access::{
    AccessLevel, CAREGIVER_LABEL, CO_OWNER_LABEL, MemberRole, PRIMARY_OWNER_LABEL,
    RecipientMembers,
};
pub use care_log::{
    CARE_LOG_NOTES_MAX_LENGTH, CareActivity, CareLog, CareLogId, normalize_care_log_notes,
};
pub use membership::{Membership, MembershipId, MembershipRole};
pub use recipient::{CareRecipient, RecipientCategory, RecipientId, normalize_attributes};
pub use user::{
    EXTERNAL_IDENTITY_PASSWORD_HASH, EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, User,
    UserId, validate_password,
};
