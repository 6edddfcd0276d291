use std::str::FromStr;

use attenthive_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{RecipientId, UserId};

/// Maximum length of free-form care log notes.
pub const CARE_LOG_NOTES_MAX_LENGTH: usize = 2000;

/// Unique identifier for a care log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CareLogId(Uuid);

impl CareLogId {
    /// Creates a new random care log identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a care log identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a care log identifier from its string form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid care log id '{value}': {error}"))
        })
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CareLogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CareLogId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Kind of care activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CareActivity {
    /// Meal or feeding.
    Feeding,
    /// Walk or exercise.
    Walking,
    /// Medication given.
    Medication,
    /// Plant watering.
    Watering,
    /// Grooming or hygiene.
    Grooming,
    /// Veterinary or medical appointment.
    VetVisit,
    /// Anything else.
    Other,
}

impl CareActivity {
    /// Returns a stable storage value for this activity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feeding => "FEEDING",
            Self::Walking => "WALKING",
            Self::Medication => "MEDICATION",
            Self::Watering => "WATERING",
            Self::Grooming => "GROOMING",
            Self::VetVisit => "VET_VISIT",
            Self::Other => "OTHER",
        }
    }
}

impl FromStr for CareActivity {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FEEDING" => Ok(Self::Feeding),
            "WALKING" => Ok(Self::Walking),
            "MEDICATION" => Ok(Self::Medication),
            "WATERING" => Ok(Self::Watering),
            "GROOMING" => Ok(Self::Grooming),
            "VET_VISIT" => Ok(Self::VetVisit),
            "OTHER" => Ok(Self::Other),
            _ => Err(AppError::Validation(format!(
                "unknown care activity '{value}'"
            ))),
        }
    }
}

/// One recorded care activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareLog {
    /// Unique entry identifier.
    pub id: CareLogId,
    /// Recipient the activity was performed for.
    pub recipient_id: RecipientId,
    /// User who performed and logged the activity.
    pub user_id: UserId,
    /// Activity kind.
    pub activity: CareActivity,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the activity happened.
    pub occurred_at: DateTime<Utc>,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// Trims notes, drops blank ones, and enforces the length limit.
pub fn normalize_care_log_notes(notes: Option<String>) -> AppResult<Option<String>> {
    let Some(notes) = notes else {
        return Ok(None);
    };

    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > CARE_LOG_NOTES_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "care log notes must not exceed {CARE_LOG_NOTES_MAX_LENGTH} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{CARE_LOG_NOTES_MAX_LENGTH, CareActivity, normalize_care_log_notes};

    #[test]
    fn activity_parses_storage_value() {
        assert_eq!(
            CareActivity::from_str("vet_visit").ok(),
            Some(CareActivity::VetVisit)
        );
        assert!(CareActivity::from_str("juggling").is_err());
    }

    #[test]
    fn blank_notes_are_dropped() {
        assert_eq!(
            normalize_care_log_notes(Some("   ".to_owned())).ok(),
            Some(None)
        );
    }

    #[test]
    fn oversized_notes_are_rejected() {
        let notes = "x".repeat(CARE_LOG_NOTES_MAX_LENGTH + 1);
        assert!(normalize_care_log_notes(Some(notes)).is_err());
    }
}
