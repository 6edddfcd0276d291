use attenthive_domain::{EXTERNAL_IDENTITY_PASSWORD_HASH, EmailAddress};

use super::*;

impl UserService {
    /// Authenticates a user with email and password.
    ///
    /// Returns `AuthOutcome::Failed` for unknown emails, wrong passwords, and
    /// externally bootstrapped accounts alike.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let Ok(email_address) = EmailAddress::new(email) else {
            return Ok(AuthOutcome::Failed);
        };

        let user = self
            .user_repository
            .find_by_email(email_address.as_str())
            .await?;

        let Some(user) = user else {
            // Always hash to keep timing uniform when the user is missing.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if user.password_hash == EXTERNAL_IDENTITY_PASSWORD_HASH {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        }

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(User::from(user)))
    }
}
