use std::sync::Arc;

use async_trait::async_trait;
use attenthive_core::{AppError, AppResult, UserIdentity};
use attenthive_domain::{
    CareLog, CareLogId, CareRecipient, Membership, MembershipId, MembershipRole, RecipientId,
    UserId,
};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    Actor, AttemptInfo, CareLogRepository, EmailService, MemberDetail, MembershipRepository,
    NewCareLog, NewRecipient, NewUser, PasswordHasher, RateLimitRepository, RecipientAccessRow,
    RecipientChanges, RecipientRepository, SharedRecipient, UserRecord, UserRepository,
};

#[derive(Default)]
pub(crate) struct StoreState {
    pub users: Vec<UserRecord>,
    pub recipients: Vec<CareRecipient>,
    pub memberships: Vec<Membership>,
    pub care_logs: Vec<CareLog>,
}

/// In-memory store implementing every persistence port for service tests.
#[derive(Default)]
pub(crate) struct FakeStore {
    pub state: Mutex<StoreState>,
}

impl FakeStore {
    pub async fn seed_user(&self, email: &str, display_name: &str) -> Actor {
        let record = UserRecord {
            id: UserId::new(),
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            phone: None,
            address: None,
            password_hash: format!("hashed:{display_name}-password"),
        };
        self.state.lock().await.users.push(record.clone());
        Actor::from_record(record).unwrap_or_else(|error| panic!("invalid seed user: {error}"))
    }

    pub async fn seed_recipient(&self, owner: &Actor, name: &str) -> RecipientId {
        let recipient = RecipientRepository::create(
            self,
            NewRecipient {
                owner_id: owner.id(),
                name: name.to_owned(),
                category: attenthive_domain::RecipientCategory::Pet,
                subtype: Some("dog".to_owned()),
                notes: None,
                attributes: serde_json::json!({}),
            },
        )
        .await
        .unwrap_or_else(|error| panic!("failed to seed recipient: {error}"));
        recipient.id
    }

    pub async fn seed_membership(
        &self,
        recipient_id: RecipientId,
        member: &Actor,
        role: MembershipRole,
    ) -> Membership {
        self.upsert(recipient_id, member.id(), role)
            .await
            .unwrap_or_else(|error| panic!("failed to seed membership: {error}"))
    }

    pub async fn memberships_of(&self, recipient_id: RecipientId) -> Vec<Membership> {
        self.state
            .lock()
            .await
            .memberships
            .iter()
            .filter(|membership| membership.recipient_id == recipient_id)
            .cloned()
            .collect()
    }
}

pub(crate) fn identity_for(actor: &Actor) -> UserIdentity {
    UserIdentity::new(
        actor.email().as_str(),
        actor.display_name(),
        Some(actor.id().to_string()),
    )
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut state = self.state.lock().await;
        if state
            .users
            .iter()
            .any(|existing| existing.email == user.email)
        {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                user.email
            )));
        }

        let record = UserRecord {
            id: UserId::new(),
            email: user.email,
            display_name: user.display_name,
            phone: None,
            address: None,
            password_hash: user.password_hash,
        };
        state.users.push(record.clone());
        Ok(record)
    }

    async fn get_or_create_by_email(&self, user: NewUser) -> AppResult<UserRecord> {
        if let Some(existing) = UserRepository::find_by_email(self, &user.email).await? {
            return Ok(existing);
        }

        UserRepository::create(self, user).await
    }
}

#[async_trait]
impl RecipientRepository for FakeStore {
    async fn create(&self, recipient: NewRecipient) -> AppResult<CareRecipient> {
        let now = Utc::now();
        let recipient = CareRecipient {
            id: RecipientId::new(),
            owner_id: recipient.owner_id,
            name: recipient.name,
            category: recipient.category,
            subtype: recipient.subtype,
            notes: recipient.notes,
            attributes: recipient.attributes,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.recipients.push(recipient.clone());
        Ok(recipient)
    }

    async fn find_by_id(&self, recipient_id: RecipientId) -> AppResult<Option<CareRecipient>> {
        Ok(self
            .state
            .lock()
            .await
            .recipients
            .iter()
            .find(|recipient| recipient.id == recipient_id)
            .cloned())
    }

    async fn list_owned_by(&self, owner_id: UserId) -> AppResult<Vec<CareRecipient>> {
        Ok(self
            .state
            .lock()
            .await
            .recipients
            .iter()
            .filter(|recipient| recipient.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        recipient_id: RecipientId,
        changes: RecipientChanges,
    ) -> AppResult<Option<CareRecipient>> {
        let mut state = self.state.lock().await;
        let Some(recipient) = state
            .recipients
            .iter_mut()
            .find(|recipient| recipient.id == recipient_id)
        else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            recipient.name = name;
        }
        if let Some(subtype) = changes.subtype {
            recipient.subtype = subtype;
        }
        if let Some(notes) = changes.notes {
            recipient.notes = notes;
        }
        if let Some(attributes) = changes.attributes {
            recipient.attributes = attributes;
        }
        recipient.updated_at = Utc::now();

        Ok(Some(recipient.clone()))
    }

    async fn delete(&self, recipient_id: RecipientId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.recipients.len();
        state
            .recipients
            .retain(|recipient| recipient.id != recipient_id);
        state
            .memberships
            .retain(|membership| membership.recipient_id != recipient_id);
        state
            .care_logs
            .retain(|entry| entry.recipient_id != recipient_id);
        Ok(state.recipients.len() != before)
    }

    async fn find_access_row(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
    ) -> AppResult<Option<RecipientAccessRow>> {
        let state = self.state.lock().await;
        let Some(recipient) = state
            .recipients
            .iter()
            .find(|recipient| recipient.id == recipient_id)
        else {
            return Ok(None);
        };

        let membership_role = state
            .memberships
            .iter()
            .find(|membership| {
                membership.recipient_id == recipient_id && membership.user_id == user_id
            })
            .map(|membership| membership.role);

        Ok(Some(RecipientAccessRow {
            owner_id: recipient.owner_id,
            membership_role,
        }))
    }

    async fn list_shared_with(&self, user_id: UserId) -> AppResult<Vec<SharedRecipient>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .filter(|membership| {
                membership.user_id == user_id
                    && matches!(
                        membership.role,
                        MembershipRole::Caregiver | MembershipRole::Viewer
                    )
            })
            .filter_map(|membership| {
                state
                    .recipients
                    .iter()
                    .find(|recipient| recipient.id == membership.recipient_id)
                    .map(|recipient| SharedRecipient {
                        recipient: recipient.clone(),
                        role: membership.role,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl MembershipRepository for FakeStore {
    async fn list_for_recipient(&self, recipient_id: RecipientId) -> AppResult<Vec<Membership>> {
        Ok(self.memberships_of(recipient_id).await)
    }

    async fn list_details_for_recipient(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<Vec<MemberDetail>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .filter(|membership| membership.recipient_id == recipient_id)
            .filter_map(|membership| {
                state
                    .users
                    .iter()
                    .find(|user| user.id == membership.user_id)
                    .map(|user| MemberDetail {
                        membership: membership.clone(),
                        display_name: user.display_name.clone(),
                        email: user.email.clone(),
                    })
            })
            .collect())
    }

    async fn find_by_id(&self, membership_id: MembershipId) -> AppResult<Option<Membership>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .find(|membership| membership.id == membership_id)
            .cloned())
    }

    async fn upsert(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<Membership> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        if let Some(existing) = state.memberships.iter_mut().find(|membership| {
            membership.recipient_id == recipient_id && membership.user_id == user_id
        }) {
            existing.role = role;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let membership = Membership {
            id: MembershipId::new(),
            recipient_id,
            user_id,
            role,
            created_at: now,
            updated_at: now,
        };
        state.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn delete(&self, membership_id: MembershipId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.memberships.len();
        state
            .memberships
            .retain(|membership| membership.id != membership_id);
        Ok(state.memberships.len() != before)
    }

    async fn delete_matching(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.memberships.len();
        state.memberships.retain(|membership| {
            !(membership.recipient_id == recipient_id
                && membership.user_id == user_id
                && membership.role == role)
        });
        Ok((before - state.memberships.len()) as u64)
    }
}

#[async_trait]
impl CareLogRepository for FakeStore {
    async fn create(&self, entry: NewCareLog) -> AppResult<CareLog> {
        let log = CareLog {
            id: CareLogId::new(),
            recipient_id: entry.recipient_id,
            user_id: entry.user_id,
            activity: entry.activity,
            notes: entry.notes,
            occurred_at: entry.occurred_at,
            created_at: Utc::now(),
        };
        self.state.lock().await.care_logs.push(log.clone());
        Ok(log)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        limit: u32,
    ) -> AppResult<Vec<CareLog>> {
        let mut entries: Vec<CareLog> = self
            .state
            .lock()
            .await
            .care_logs
            .iter()
            .filter(|entry| entry.recipient_id == recipient_id)
            .cloned()
            .collect();
        entries.sort_by(|left, right| right.occurred_at.cmp(&left.occurred_at));
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn find_by_id(&self, care_log_id: CareLogId) -> AppResult<Option<CareLog>> {
        Ok(self
            .state
            .lock()
            .await
            .care_logs
            .iter()
            .find(|entry| entry.id == care_log_id)
            .cloned())
    }

    async fn delete(&self, care_log_id: CareLogId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.care_logs.len();
        state.care_logs.retain(|entry| entry.id != care_log_id);
        Ok(state.care_logs.len() != before)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
}

#[derive(Default)]
pub(crate) struct FakeEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: bool,
}

impl FakeEmailService {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl EmailService for FakeEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("smtp relay unavailable".to_owned()));
        }

        self.sent.lock().await.push(SentEmail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            text_body: text_body.to_owned(),
        });
        Ok(())
    }
}

pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        match hash.strip_prefix("hashed:") {
            Some(stored) => Ok(stored == password),
            None => Err(AppError::Internal(format!("unparseable hash '{hash}'"))),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeRateLimitRepository {
    pub attempts: Mutex<std::collections::HashMap<String, i32>>,
}

#[async_trait]
impl RateLimitRepository for FakeRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        _window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let mut attempts = self.attempts.lock().await;
        let count = attempts.entry(key.to_owned()).or_insert(0);
        *count += 1;
        Ok(AttemptInfo {
            attempt_count: *count,
            window_started_at: Utc::now(),
        })
    }

    async fn cleanup_expired(&self, _before: chrono::DateTime<Utc>) -> AppResult<u64> {
        let mut attempts = self.attempts.lock().await;
        let removed = attempts.len() as u64;
        attempts.clear();
        Ok(removed)
    }
}

pub(crate) fn shared_store() -> Arc<FakeStore> {
    Arc::new(FakeStore::default())
}
