//! Care recipient lifecycle: creation, listing, editing, and deletion.

use std::str::FromStr;
use std::sync::Arc;

use attenthive_core::{AppError, AppResult, FieldViolation, NonEmptyString};
use attenthive_domain::{
    AccessLevel, CareRecipient, RecipientCategory, RecipientId, UserId, normalize_attributes,
};
use tracing::info;

use crate::{AccessService, NewRecipient, RecipientChanges, RecipientRepository};


/// Maximum length of a recipient name.
pub const RECIPIENT_NAME_MAX_LENGTH: usize = 120;
/// Maximum length of a recipient subtype.
pub const RECIPIENT_SUBTYPE_MAX_LENGTH: usize = 80;
/// Maximum length of recipient notes.
pub const RECIPIENT_NOTES_MAX_LENGTH: usize = 4000;

/// Raw input for creating a recipient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateRecipientInput {
    /// Display name.
    pub name: String,
    /// Category name: PET, PLANT, or PERSON.
    pub category: String,
    /// Optional subtype.
    pub subtype: Option<String>,
    /// Optional notes.
    pub notes: Option<String>,
    /// Optional attributes object.
    pub attributes: Option<serde_json::Value>,
}

/// Raw input for editing a recipient. Absent fields are left unchanged; an
/// empty subtype or notes string clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRecipientInput {
    /// New display name.
    pub name: Option<String>,
    /// New subtype.
    pub subtype: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// Replacement attributes object.
    pub attributes: Option<serde_json::Value>,
}

/// The requesting user's relation to a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSummary {
    /// Recipient the summary describes.
    pub recipient_id: RecipientId,
    /// Effective access level.
    pub access: AccessLevel,
    /// Display label.
    pub label: &'static str,
    /// Whether the user may log care and edit shared data.
    pub can_write: bool,
    /// Whether the user may edit details and invite members.
    pub can_manage: bool,
}

/// Application service for care recipients.
#[derive(Clone)]
pub struct RecipientService {
    recipient_repository: Arc<dyn RecipientRepository>,
    access_service: AccessService,
}

impl RecipientService {
    /// Creates a new recipient service.
    #[must_use]
    pub fn new(
        recipient_repository: Arc<dyn RecipientRepository>,
        access_service: AccessService,
    ) -> Self {
        Self {
            recipient_repository,
            access_service,
        }
    }

    /// Creates a recipient owned by `owner_id`.
    pub async fn create_recipient(
        &self,
        owner_id: UserId,
        input: CreateRecipientInput,
    ) -> AppResult<CareRecipient> {
        let mut violations = Vec::new();

        let name = collect(&mut violations, "name", normalize_name(input.name));
        let category = collect(
            &mut violations,
            "category",
            RecipientCategory::from_str(input.category.as_str()),
        );
        let subtype = collect(
            &mut violations,
            "subtype",
            normalize_optional_text("subtype", input.subtype, RECIPIENT_SUBTYPE_MAX_LENGTH),
        );
        let notes = collect(
            &mut violations,
            "notes",
            normalize_optional_text("notes", input.notes, RECIPIENT_NOTES_MAX_LENGTH),
        );
        let attributes = collect(
            &mut violations,
            "attributes",
            normalize_attributes(input.attributes),
        );

        let (Some(name), Some(category), Some(subtype), Some(notes), Some(attributes)) =
            (name, category, subtype, notes, attributes)
        else {
            return Err(AppError::InvalidInput(violations));
        };

        let recipient = self
            .recipient_repository
            .create(NewRecipient {
                owner_id,
                name,
                category,
                subtype,
                notes,
                attributes,
            })
            .await?;

        info!(
            recipient_id = %recipient.id,
            owner_id = %owner_id,
            category = recipient.category.as_str(),
            "created care recipient"
        );

        Ok(recipient)
    }

    /// Lists recipients the user owns as primary owner.
    pub async fn list_owned(&self, owner_id: UserId) -> AppResult<Vec<CareRecipient>> {
        self.recipient_repository.list_owned_by(owner_id).await
    }

    /// Returns a recipient the user can read.
    pub async fn get_recipient(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<CareRecipient> {
        self.access_service
            .require_read(user_id, recipient_id)
            .await?;
        self.find_existing(recipient_id).await
    }

    /// Summarizes the user's access to a recipient.
    pub async fn access_summary(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<AccessSummary> {
        let access = self
            .access_service
            .access_level(user_id, recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipient '{recipient_id}' not found")))?;

        Ok(AccessSummary {
            recipient_id,
            access,
            label: access.label(),
            can_write: access.can_write(),
            can_manage: access.is_owner(),
        })
    }

    /// Edits a recipient. Owners and co-owners only.
    pub async fn update_recipient(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
        input: UpdateRecipientInput,
    ) -> AppResult<CareRecipient> {
        let level = self
            .access_service
            .require_read(user_id, recipient_id)
            .await?;
        if !level.is_owner() {
            return Err(AppError::Forbidden(format!(
                "user '{user_id}' cannot edit recipient '{recipient_id}'"
            )));
        }

        let changes = normalize_changes(input)?;
        let recipient = self
            .recipient_repository
            .update(recipient_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipient '{recipient_id}' not found")))?;

        info!(recipient_id = %recipient_id, edited_by = %user_id, "updated care recipient");

        Ok(recipient)
    }

    /// Deletes a recipient with its memberships and logs. Primary owner only.
    pub async fn delete_recipient(
        &self,
        user_id: UserId,
        recipient_id: RecipientId,
    ) -> AppResult<()> {
        let recipient = self.find_existing(recipient_id).await?;
        if recipient.owner_id != user_id {
            return Err(AppError::Forbidden(
                "only the primary owner can delete a recipient".to_owned(),
            ));
        }

        if !self.recipient_repository.delete(recipient_id).await? {
            return Err(AppError::NotFound(format!(
                "recipient '{recipient_id}' not found"
            )));
        }

        info!(recipient_id = %recipient_id, "deleted care recipient");

        Ok(())
    }

    async fn find_existing(&self, recipient_id: RecipientId) -> AppResult<CareRecipient> {
        self.recipient_repository
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recipient '{recipient_id}' not found")))
    }
}

fn collect<T>(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    result: AppResult<T>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            violations.push(FieldViolation::new(field, violation_message(error)));
            None
        }
    }
}

fn violation_message(error: AppError) -> String {
    match error {
        AppError::Validation(message) => message,
        other => other.to_string(),
    }
}

fn normalize_name(name: String) -> AppResult<String> {
    let name = NonEmptyString::new(name)
        .map_err(|_| AppError::Validation("name must not be empty".to_owned()))?;

    if name.as_str().chars().count() > RECIPIENT_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "name must not exceed {RECIPIENT_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(name.into())
}

fn normalize_optional_text(
    field: &str,
    value: Option<String>,
    max_length: usize,
) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > max_length {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {max_length} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}

fn normalize_changes(input: UpdateRecipientInput) -> AppResult<RecipientChanges> {
    let mut violations = Vec::new();

    let name = input
        .name
        .and_then(|name| collect(&mut violations, "name", normalize_name(name)));
    let subtype = match input.subtype {
        Some(subtype) => collect(
            &mut violations,
            "subtype",
            normalize_optional_text("subtype", Some(subtype), RECIPIENT_SUBTYPE_MAX_LENGTH),
        ),
        None => None,
    };
    let notes = match input.notes {
        Some(notes) => collect(
            &mut violations,
            "notes",
            normalize_optional_text("notes", Some(notes), RECIPIENT_NOTES_MAX_LENGTH),
        ),
        None => None,
    };
    let attributes = match input.attributes {
        Some(attributes) => collect(
            &mut violations,
            "attributes",
            normalize_attributes(Some(attributes)),
        ),
        None => None,
    };

    if !violations.is_empty() {
        return Err(AppError::InvalidInput(violations));
    }

    Ok(RecipientChanges {
        name,
        subtype,
        notes,
        attributes,
    })
}
