//! Current-actor resolution.
//!
//! Every authenticated request resolves its session identity to a database
//! user exactly once, here. Identities arriving from an external provider
//! are bootstrapped on first use with a placeholder password hash.

use std::sync::Arc;

use attenthive_core::{AppError, AppResult, UserIdentity};
use attenthive_domain::{EXTERNAL_IDENTITY_PASSWORD_HASH, EmailAddress, UserId};
use tracing::{debug, info};

use crate::{NewUser, UserRecord, UserRepository};

/// Database user acting in the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    email: EmailAddress,
    display_name: String,
}

impl Actor {
    /// Creates an actor from a persisted user record.
    pub fn from_record(record: UserRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id,
            email: EmailAddress::new(record.email)?,
            display_name: record.display_name,
        })
    }

    /// Returns the acting user id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the acting user's canonical email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the acting user's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}

/// Resolves session identities to actors.
#[derive(Clone)]
pub struct ActorResolver {
    user_repository: Arc<dyn UserRepository>,
}

impl ActorResolver {
    /// Creates a resolver over the user repository.
    #[must_use]
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// Resolves the identity, creating the user by email if it does not exist.
    pub async fn resolve(&self, identity: &UserIdentity) -> AppResult<Actor> {
        let email = EmailAddress::new(identity.email()).map_err(|_| {
            AppError::Unauthorized("session identity has no usable email".to_owned())
        })?;

        if let Some(subject) = identity.subject()
            && let Ok(user_id) = UserId::parse(subject)
            && let Some(record) = self.user_repository.find_by_id(user_id).await?
            && record.email == email.as_str()
        {
            return Actor::from_record(record);
        }

        if let Some(record) = self.user_repository.find_by_email(email.as_str()).await? {
            debug!(user_id = %record.id, "resolved session identity by email");
            return Actor::from_record(record);
        }

        let display_name = match identity.display_name().trim() {
            "" => email.local_part().to_owned(),
            name => name.to_owned(),
        };

        let record = self
            .user_repository
            .get_or_create_by_email(NewUser {
                email: email.as_str().to_owned(),
                display_name,
                password_hash: EXTERNAL_IDENTITY_PASSWORD_HASH.to_owned(),
            })
            .await?;

        info!(user_id = %record.id, "bootstrapped user from external identity");

        Actor::from_record(record)
    }
}
