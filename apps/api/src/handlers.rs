mod care_logs;
mod health;
mod members;
mod recipients;

pub use care_logs::{delete_care_log_handler, list_care_logs_handler, record_care_log_handler};
pub use health::health_handler;
pub use members::{
    invite_handler, list_members_handler, remove_caregiver_handler, remove_member_handler,
    shared_pets_handler,
};
pub use recipients::{
    access_summary_handler, create_recipient_handler, delete_recipient_handler,
    get_recipient_handler, list_recipients_handler, update_recipient_handler,
};
