use attenthive_core::AppError;
use attenthive_domain::{EmailAddress, validate_password};
use tracing::info;

use super::*;

impl UserService {
    /// Registers a new user with email and password.
    pub async fn register(&self, params: RegisterParams) -> AppResult<User> {
        let email_address = EmailAddress::new(&params.email)?;
        validate_password(&params.password)?;

        let existing = self
            .user_repository
            .find_by_email(email_address.as_str())
            .await?;

        if existing.is_some() {
            // Hash anyway so the response time does not reveal the account.
            let _ = self.password_hasher.hash_password(&params.password);
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let display_name = params
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| email_address.local_part())
            .to_owned();

        let password_hash = self.password_hasher.hash_password(&params.password)?;
        let record = self
            .user_repository
            .create(NewUser {
                email: email_address.as_str().to_owned(),
                display_name,
                password_hash,
            })
            .await?;

        info!(user_id = %record.id, "registered user");

        Ok(User::from(record))
    }
}
