use attenthive_application::Actor;
use attenthive_domain::RecipientId;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;

use crate::dto::{
    AccessSummaryResponse, CreateRecipientRequest, RecipientResponse, UpdateRecipientRequest,
    parse_single,
};
use crate::error::{ApiJson, ApiPath, ApiResult};
use crate::state::AppState;

pub(crate) fn recipient_path(raw: &str) -> ApiResult<RecipientId> {
    Ok(parse_single("recipientId", RecipientId::parse(raw))?)
}

pub async fn list_recipients_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<RecipientResponse>>> {
    let recipients = state
        .recipient_service
        .list_owned(actor.id())
        .await?
        .into_iter()
        .map(RecipientResponse::from)
        .collect();

    Ok(Json(recipients))
}

pub async fn create_recipient_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<CreateRecipientRequest>,
) -> ApiResult<(StatusCode, Json<RecipientResponse>)> {
    let recipient = state
        .recipient_service
        .create_recipient(actor.id(), payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(RecipientResponse::from(recipient))))
}

pub async fn get_recipient_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(recipient_id): ApiPath<String>,
) -> ApiResult<Json<RecipientResponse>> {
    let recipient_id = recipient_path(recipient_id.as_str())?;
    let recipient = state
        .recipient_service
        .get_recipient(actor.id(), recipient_id)
        .await?;

    Ok(Json(RecipientResponse::from(recipient)))
}

pub async fn access_summary_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(recipient_id): ApiPath<String>,
) -> ApiResult<Json<AccessSummaryResponse>> {
    let recipient_id = recipient_path(recipient_id.as_str())?;
    let summary = state
        .recipient_service
        .access_summary(actor.id(), recipient_id)
        .await?;

    Ok(Json(AccessSummaryResponse::from(summary)))
}

pub async fn update_recipient_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(recipient_id): ApiPath<String>,
    ApiJson(payload): ApiJson<UpdateRecipientRequest>,
) -> ApiResult<Json<RecipientResponse>> {
    let recipient_id = recipient_path(recipient_id.as_str())?;
    let recipient = state
        .recipient_service
        .update_recipient(actor.id(), recipient_id, payload.into())
        .await?;

    Ok(Json(RecipientResponse::from(recipient)))
}

pub async fn delete_recipient_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(recipient_id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    let recipient_id = recipient_path(recipient_id.as_str())?;
    state
        .recipient_service
        .delete_recipient(actor.id(), recipient_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
