use std::str::FromStr;

use attenthive_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// Unique identifier for a care recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipientId(Uuid);

impl RecipientId {
    /// Creates a new random recipient identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a recipient identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a recipient identifier from its string form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid recipient id '{value}': {error}"))
        })
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecipientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecipientId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Kind of being under care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientCategory {
    /// Companion animal.
    Pet,
    /// House or garden plant.
    Plant,
    /// Person receiving care.
    Person,
}

impl RecipientCategory {
    /// Returns a stable storage value for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pet => "PET",
            Self::Plant => "PLANT",
            Self::Person => "PERSON",
        }
    }
}

impl FromStr for RecipientCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PET" => Ok(Self::Pet),
            "PLANT" => Ok(Self::Plant),
            "PERSON" => Ok(Self::Person),
            _ => Err(AppError::Validation(format!(
                "unknown recipient category '{value}'"
            ))),
        }
    }
}

/// A pet, plant, or person owned by exactly one primary owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRecipient {
    /// Unique recipient identifier.
    pub id: RecipientId,
    /// Primary owner. Never reassigned.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Recipient category.
    pub category: RecipientCategory,
    /// Free-form subtype such as a species or breed.
    pub subtype: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Category-specific attributes. Always a JSON object.
    pub attributes: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validates that category attributes are a JSON object, mapping `null` to `{}`.
pub fn normalize_attributes(attributes: Option<serde_json::Value>) -> AppResult<serde_json::Value> {
    match attributes {
        None | Some(serde_json::Value::Null) => Ok(serde_json::Value::Object(Default::default())),
        Some(value @ serde_json::Value::Object(_)) => Ok(value),
        Some(_) => Err(AppError::Validation(
            "recipient attributes must be a JSON object".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{RecipientCategory, normalize_attributes};

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            RecipientCategory::from_str("plant").ok(),
            Some(RecipientCategory::Plant)
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(RecipientCategory::from_str("ROCK").is_err());
    }

    #[test]
    fn missing_attributes_become_an_empty_object() {
        let attributes = normalize_attributes(None);
        assert_eq!(attributes.ok(), Some(serde_json::json!({})));
    }

    #[test]
    fn array_attributes_are_rejected() {
        assert!(normalize_attributes(Some(serde_json::json!([1, 2]))).is_err());
    }
}
