use serde::{Deserialize, Serialize};

/// User information persisted in the authenticated session.
///
/// The email is the stable identity key. The subject is the database user id
/// once the identity has been resolved against the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    email: String,
    display_name: String,
    subject: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        subject: Option<String>,
    ) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            subject,
        }
    }

    /// Returns the email address the session was established for.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the database user id, if the session already carries one.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}
