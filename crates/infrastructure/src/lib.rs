//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_email_service;
mod in_memory_care_store;
mod postgres_care_log_repository;
mod postgres_membership_repository;
mod postgres_rate_limit_repository;
mod postgres_recipient_repository;
mod postgres_user_repository;
mod smtp_email_service;

#[cfg(test)]
mod test_database;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use console_email_service::ConsoleEmailService;
pub use in_memory_care_store::InMemoryCareStore;
pub use postgres_care_log_repository::PostgresCareLogRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_recipient_repository::PostgresRecipientRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
