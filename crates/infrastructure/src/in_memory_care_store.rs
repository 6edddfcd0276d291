//! In-memory implementation of every persistence port, for tests and local
//! experiments without PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use attenthive_application::{
    AttemptInfo, CareLogRepository, MemberDetail, MembershipRepository, NewCareLog, NewRecipient,
    NewUser, RateLimitRepository, RecipientAccessRow, RecipientChanges, RecipientRepository,
    SharedRecipient, UserRecord, UserRepository,
};
use attenthive_core::{AppError, AppResult};
use attenthive_domain::{
    CareLog, CareLogId, CareRecipient, Membership, MembershipId, MembershipRole, RecipientId,
    UserId,
};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct CareTables {
    users: HashMap<UserId, UserRecord>,
    recipients: HashMap<RecipientId, CareRecipient>,
    memberships: HashMap<MembershipId, Membership>,
    care_logs: HashMap<CareLogId, CareLog>,
    rate_limits: HashMap<String, AttemptInfo>,
}

/// Process-local store backed by hash maps behind one lock.
#[derive(Debug, Default)]
pub struct InMemoryCareStore {
    tables: RwLock<CareTables>,
}

impl InMemoryCareStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryCareStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let record = UserRecord {
            id: UserId::new(),
            email: user.email,
            display_name: user.display_name,
            phone: None,
            address: None,
            password_hash: user.password_hash,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_or_create_by_email(&self, user: NewUser) -> AppResult<UserRecord> {
        match UserRepository::create(self, user.clone()).await {
            Err(AppError::Conflict(_)) => UserRepository::find_by_email(self, &user.email)
                .await?
                .ok_or_else(|| AppError::Internal(format!("user '{}' vanished", user.email))),
            other => other,
        }
    }
}

#[async_trait]
impl RecipientRepository for InMemoryCareStore {
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
        self.tables
            .write()
            .await
            .recipients
            .insert(recipient.id, recipient.clone());
        Ok(recipient)
    }

    async fn find_by_id(&self, recipient_id: RecipientId) -> AppResult<Option<CareRecipient>> {
        Ok(self
            .tables
            .read()
            .await
            .recipients
            .get(&recipient_id)
            .cloned())
    }

    async fn list_owned_by(&self, owner_id: UserId) -> AppResult<Vec<CareRecipient>> {
        let tables = self.tables.read().await;
        let mut owned: Vec<CareRecipient> = tables
            .recipients
            .values()
            .filter(|recipient| recipient.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|recipient| (recipient.created_at, recipient.id));
        Ok(owned)
    }

    async fn update(
        &self,
        recipient_id: RecipientId,
        changes: RecipientChanges,
    ) -> AppResult<Option<CareRecipient>> {
        let mut tables = self.tables.write().await;
        let Some(recipient) = tables.recipients.get_mut(&recipient_id) else {
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
        let mut tables = self.tables.write().await;
        let removed = tables.recipients.remove(&recipient_id).is_some();
        tables
            .memberships
            .retain(|_, membership| membership.recipient_id != recipient_id);
        tables
            .care_logs
            .retain(|_, entry| entry.recipient_id != recipient_id);
        Ok(removed)
    }

    async fn find_access_row(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
    ) -> AppResult<Option<RecipientAccessRow>> {
        let tables = self.tables.read().await;
        Ok(tables.recipients.get(&recipient_id).map(|recipient| {
            RecipientAccessRow {
                owner_id: recipient.owner_id,
                membership_role: tables
                    .memberships
                    .values()
                    .find(|membership| {
                        membership.recipient_id == recipient_id && membership.user_id == user_id
                    })
                    .map(|membership| membership.role),
            }
        }))
    }

    async fn list_shared_with(&self, user_id: UserId) -> AppResult<Vec<SharedRecipient>> {
        let tables = self.tables.read().await;
        let mut shared: Vec<(DateTime<Utc>, SharedRecipient)> = tables
            .memberships
            .values()
            .filter(|membership| {
                membership.user_id == user_id && membership.role != MembershipRole::Owner
            })
            .filter_map(|membership| {
                tables
                    .recipients
                    .get(&membership.recipient_id)
                    .map(|recipient| {
                        (
                            membership.created_at,
                            SharedRecipient {
                                recipient: recipient.clone(),
                                role: membership.role,
                            },
                        )
                    })
            })
            .collect();
        shared.sort_by_key(|(created_at, entry)| (*created_at, entry.recipient.id));
        Ok(shared.into_iter().map(|(_, entry)| entry).collect())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryCareStore {
    async fn list_for_recipient(&self, recipient_id: RecipientId) -> AppResult<Vec<Membership>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|membership| membership.recipient_id == recipient_id)
            .cloned()
            .collect();
        rows.sort_by_key(|membership| membership.created_at);
        Ok(rows)
    }

    async fn list_details_for_recipient(
        &self,
        recipient_id: RecipientId,
    ) -> AppResult<Vec<MemberDetail>> {
        let rows = MembershipRepository::list_for_recipient(self, recipient_id).await?;
        let tables = self.tables.read().await;
        Ok(rows
            .into_iter()
            .filter_map(|membership| {
                let user = tables.users.get(&membership.user_id)?;
                Some(MemberDetail {
                    display_name: user.display_name.clone(),
                    email: user.email.clone(),
                    membership,
                })
            })
            .collect())
    }

    async fn find_by_id(&self, membership_id: MembershipId) -> AppResult<Option<Membership>> {
        Ok(self
            .tables
            .read()
            .await
            .memberships
            .get(&membership_id)
            .cloned())
    }

    async fn upsert(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<Membership> {
        let mut tables = self.tables.write().await;
        if !tables.recipients.contains_key(&recipient_id) || !tables.users.contains_key(&user_id)
        {
            return Err(AppError::NotFound(format!(
                "recipient '{recipient_id}' or user '{user_id}' does not exist"
            )));
        }

        let now = Utc::now();
        if let Some(existing) = tables.memberships.values_mut().find(|membership| {
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
        tables.memberships.insert(membership.id, membership.clone());
        Ok(membership)
    }

    async fn delete(&self, membership_id: MembershipId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .memberships
            .remove(&membership_id)
            .is_some())
    }

    async fn delete_matching(
        &self,
        recipient_id: RecipientId,
        user_id: UserId,
        role: MembershipRole,
    ) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.memberships.len();
        tables.memberships.retain(|_, membership| {
            !(membership.recipient_id == recipient_id
                && membership.user_id == user_id
                && membership.role == role)
        });
        Ok((before - tables.memberships.len()) as u64)
    }
}

#[async_trait]
impl CareLogRepository for InMemoryCareStore {
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
        self.tables
            .write()
            .await
            .care_logs
            .insert(log.id, log.clone());
        Ok(log)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        limit: u32,
    ) -> AppResult<Vec<CareLog>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<CareLog> = tables
            .care_logs
            .values()
            .filter(|entry| entry.recipient_id == recipient_id)
            .cloned()
            .collect();
        entries.sort_by(|left, right| {
            right
                .occurred_at
                .cmp(&left.occurred_at)
                .then(right.created_at.cmp(&left.created_at))
        });
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn find_by_id(&self, care_log_id: CareLogId) -> AppResult<Option<CareLog>> {
        Ok(self
            .tables
            .read()
            .await
            .care_logs
            .get(&care_log_id)
            .cloned())
    }

    async fn delete(&self, care_log_id: CareLogId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .care_logs
            .remove(&care_log_id)
            .is_some())
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryCareStore {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let info = tables
            .rate_limits
            .entry(key.to_owned())
            .or_insert(AttemptInfo {
                attempt_count: 0,
                window_started_at: now,
            });

        if info.window_started_at < now - Duration::seconds(window_duration_seconds) {
            info.attempt_count = 0;
            info.window_started_at = now;
        }
        info.attempt_count += 1;

        Ok(info.clone())
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let count = tables.rate_limits.len();
        tables
            .rate_limits
            .retain(|_, info| info.window_started_at >= before);
        Ok((count - tables.rate_limits.len()) as u64)
    }
}
