//! Repository ports for care recipients, memberships, and care logs.

mod care_logs;
mod memberships;
mod recipients;

pub use care_logs::{CareLogRepository, NewCareLog};
pub use memberships::{MemberDetail, MembershipRepository};
pub use recipients::{
    NewRecipient, RecipientAccessRow, RecipientChanges, RecipientRepository, SharedRecipient,
};
