use async_trait::async_trait;
use attenthive_core::AppResult;
use attenthive_domain::{CareActivity, CareLog, CareLogId, RecipientId, UserId};
use chrono::{DateTime, Utc};

/// Values for a care log entry about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCareLog {
    /// Recipient the activity was performed for.
    pub recipient_id: RecipientId,
    /// Acting user.
    pub user_id: UserId,
    /// Activity kind.
    pub activity: CareActivity,
    /// Normalized notes.
    pub notes: Option<String>,
    /// When the activity happened.
    pub occurred_at: DateTime<Utc>,
}

/// Repository port for care activity logs.
#[async_trait]
pub trait CareLogRepository: Send + Sync {
    /// Persists a new entry.
    async fn create(&self, entry: NewCareLog) -> AppResult<CareLog>;

    /// Lists the newest entries of a recipient, most recent first.
    async fn list_for_recipient(
        &self,
        recipient_id: RecipientId,
        limit: u32,
    ) -> AppResult<Vec<CareLog>>;

    /// Finds an entry by id.
    async fn find_by_id(&self, care_log_id: CareLogId) -> AppResult<Option<CareLog>>;

    /// Deletes an entry by id.
    async fn delete(&self, care_log_id: CareLogId) -> AppResult<bool>;
}
