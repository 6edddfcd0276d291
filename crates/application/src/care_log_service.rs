//! Recording and reading care activity logs.

use std::str::FromStr;
use std::sync::Arc;

use attenthive_core::{AppError, AppResult};
use attenthive_domain::{
    CareActivity, CareLog, CareLogId, RecipientId, UserId, normalize_care_log_notes,
};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::{AccessService, CareLogRepository, NewCareLog};

/// Entries returned when the caller does not ask for a limit.
pub const DEFAULT_CARE_LOG_LIMIT: u32 = 50;
/// Upper bound on entries returned by one listing.
pub const MAX_CARE_LOG_LIMIT: u32 = 200;

/// Raw input for recording an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCareInput {
    /// Activity name, e.g. FEEDING.
    pub activity: String,
    /// Optional notes.
    pub notes: Option<String>,
    /// When the activity happened; now when omitted.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Application service for care logs.
#[derive(Clone)]
pub struct CareLogService {
    care_log_repository: Arc<dyn CareLogRepository>,
    access_service: AccessService,
}

impl CareLogService {
    /// Creates a new care log service.
    #[must_use]
    pub fn new(
        care_log_repository: Arc<dyn CareLogRepository>,
        access_service: AccessService,
    ) -> Self {
        Self {
            care_log_repository,
            access_service,
        }
    }

    /// Records an activity. Requires write access to the recipient.
    pub async fn record_activity(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
        input: RecordCareInput,
    ) -> AppResult<CareLog> {
        self.access_service
            .require_write(user_id, recipient_id)
            .await?;

        let activity = CareActivity::from_str(input.activity.as_str())?;
        let notes = normalize_care_log_notes(input.notes)?;
        let now = Utc::now();
        let occurred_at = input.occurred_at.unwrap_or(now);
        if occurred_at > now + Duration::minutes(5) {
            return Err(AppError::Validation(
                "care activity cannot be logged in the future".to_owned(),
            ));
        }

        let entry = self
            .care_log_repository
            .create(NewCareLog {
                recipient_id,
                user_id,
                activity,
                notes,
                occurred_at,
            })
            .await?;

        info!(
            recipient_id = %recipient_id,
            care_log_id = %entry.id,
            activity = activity.as_str(),
            "recorded care activity"
        );

        Ok(entry)
    }

    /// Lists recent activity, newest first. Requires read access.
    pub async fn list_activity(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
        limit: Option<u32>,
    ) -> AppResult<Vec<CareLog>> {
        self.access_service
            .require_read(user_id, recipient_id)
            .await?;

        let limit = limit
            .unwrap_or(DEFAULT_CARE_LOG_LIMIT)
            .clamp(1, MAX_CARE_LOG_LIMIT);

        self.care_log_repository
            .list_for_recipient(recipient_id, limit)
            .await
    }

    /// Deletes an entry. Its author may delete it while they can still
    /// write; owners may delete any entry.
    pub async fn delete_entry(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
        care_log_id: CareLogId,
    ) -> AppResult<()> {
        let level = self
            .access_service
            .require_write(user_id, recipient_id)
            .await?;

        let entry = self
            .care_log_repository
            .find_by_id(care_log_id)
            .await?
            .filter(|entry| entry.recipient_id == recipient_id)
            .ok_or_else(|| AppError::NotFound(format!("care log '{care_log_id}' not found")))?;

        if entry.user_id != user_id && !level.is_owner() {
            return Err(AppError::Forbidden(
                "only the author or an owner can delete this entry".to_owned(),
            ));
        }

        self.care_log_repository.delete(care_log_id).await?;
        info!(recipient_id = %recipient_id, care_log_id = %care_log_id, "deleted care log entry");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use attenthive_core::AppError;
    use attenthive_domain::{CareActivity, MembershipRole};
    use chrono::{Duration, Utc};

    use crate::AccessService;
    use crate::test_support::{FakeStore, shared_store};

    use super::{CareLogService, RecordCareInput};

    fn build_service(store: &Arc<FakeStore>) -> CareLogService {
        CareLogService::new(store.clone(), AccessService::new(store.clone()))
    }

    fn feeding(minutes_ago: i64) -> RecordCareInput {
        RecordCareInput {
            activity: "feeding".to_owned(),
            notes: Some(" half a cup ".to_owned()),
            occurred_at: Some(Utc::now() - Duration::minutes(minutes_ago)),
        }
    }

    #[tokio::test]
    async fn caregivers_record_and_viewers_only_read() {
        let store = shared_store();
        let owner = store.seed_user("alice@example.com", "Alice").await;
        let caregiver = store.seed_user("bob@example.com", "Bob").await;
        let viewer = store.seed_user("vera@example.com", "Vera").await;
        let recipient_id = store.seed_recipient(&owner, "Biscuit").await;
        store
            .seed_membership(recipient_id, &caregiver, MembershipRole::Caregiver)
            .await;
        store
            .seed_membership(recipient_id, &viewer, MembershipRole::Viewer)
            .await;
        let service = build_service(&store);

        let recorded = service
            .record_activity(caregiver.id(), recipient_id, feeding(10))
            .await;
        let Ok(recorded) = recorded else {
            panic!("caregiver should record: {recorded:?}");
        };
        assert_eq!(recorded.activity, CareActivity::Feeding);
        assert_eq!(recorded.notes.as_deref(), Some("half a cup"));

        let by_viewer = service
            .record_activity(viewer.id(), recipient_id, feeding(5))
            .await;
        assert!(matches!(by_viewer, Err(AppError::Forbidden(_))));

        let listed = service
            .list_activity(viewer.id(), recipient_id, None)
            .await
            .unwrap_or_default();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_limited() {
        let store = shared_store();
        let owner = store.seed_user("alice@example.com", "Alice").await;
        let recipient_id = store.seed_recipient(&owner, "Biscuit").await;
        let service = build_service(&store);

        for minutes_ago in [30, 10, 20] {
            assert!(
                service
                    .record_activity(owner.id(), recipient_id, feeding(minutes_ago))
                    .await
                    .is_ok()
            );
        }

        let listed = service
            .list_activity(owner.id(), recipient_id, Some(2))
            .await
            .unwrap_or_default();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].occurred_at > listed[1].occurred_at);

        let zero = service
            .list_activity(owner.id(), recipient_id, Some(0))
            .await
            .unwrap_or_default();
        assert_eq!(zero.len(), 1);
    }

    #[tokio::test]
    async fn invalid_activity_and_future_timestamps_are_rejected() {
        let store = shared_store();
        let owner = store.seed_user("alice@example.com", "Alice").await;
        let recipient_id = store.seed_recipient(&owner, "Biscuit").await;
        let service = build_service(&store);

        let unknown = service
            .record_activity(
                owner.id(),
                recipient_id,
                RecordCareInput {
                    activity: "juggling".to_owned(),
                    notes: None,
                    occurred_at: None,
                },
            )
            .await;
        assert!(matches!(unknown, Err(AppError::Validation(_))));

        let future = service
            .record_activity(owner.id(), recipient_id, feeding(-60))
            .await;
        assert!(matches!(future, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn entries_are_deleted_by_author_or_owner_only() {
        let store = shared_store();
        let owner = store.seed_user("alice@example.com", "Alice").await;
        let first = store.seed_user("bob@example.com", "Bob").await;
        let second = store.seed_user("cam@example.com", "Cam").await;
        let recipient_id = store.seed_recipient(&owner, "Biscuit").await;
        for caregiver in [&first, &second] {
            store
                .seed_membership(recipient_id, caregiver, MembershipRole::Caregiver)
                .await;
        }
        let service = build_service(&store);

        let Ok(entry) = service
            .record_activity(first.id(), recipient_id, feeding(1))
            .await
        else {
            panic!("record should succeed");
        };

        let by_other = service
            .delete_entry(second.id(), recipient_id, entry.id)
            .await;
        assert!(matches!(by_other, Err(AppError::Forbidden(_))));

        assert!(
            service
                .delete_entry(owner.id(), recipient_id, entry.id)
                .await
                .is_ok()
        );
        assert!(matches!(
            service
                .delete_entry(owner.id(), recipient_id, entry.id)
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
