use attenthive_application::{Actor, RecordCareInput};
use attenthive_domain::CareLogId;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;

use crate::dto::{CareLogQuery, CareLogResponse, RecordCareRequest, parse_single};
use crate::error::{ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::state::AppState;

use super::recipients::recipient_path;

pub async fn list_care_logs_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(recipient_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<CareLogQuery>,
) -> ApiResult<Json<Vec<CareLogResponse>>> {
    let recipient_id = recipient_path(recipient_id.as_str())?;
    let entries = state
        .care_log_service
        .list_activity(actor.id(), recipient_id, query.limit)
        .await?
        .into_iter()
        .map(CareLogResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn record_care_log_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(recipient_id): ApiPath<String>,
    ApiJson(payload): ApiJson<RecordCareRequest>,
) -> ApiResult<(StatusCode, Json<CareLogResponse>)> {
    let recipient_id = recipient_path(recipient_id.as_str())?;
    let input = RecordCareInput::try_from(payload)?;
    let entry = state
        .care_log_service
        .record_activity(actor.id(), recipient_id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(CareLogResponse::from(entry))))
}

pub async fn delete_care_log_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath((recipient_id, care_log_id)): ApiPath<(String, String)>,
) -> ApiResult<StatusCode> {
    let recipient_id = recipient_path(recipient_id.as_str())?;
    let care_log_id = parse_single("careLogId", CareLogId::parse(care_log_id.as_str()))?;

    state
        .care_log_service
        .delete_entry(actor.id(), recipient_id, care_log_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
