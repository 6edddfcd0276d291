use attenthive_application::{Actor, InviteMemberInput, RateLimitRule};
use attenthive_domain::RecipientId;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;

use crate::dto::{
    InviteRequest, InviteResponse, MembersQuery, MembersResponse, MembershipResponse,
    MessageResponse, RemoveCaregiverRequest, RemoveCaregiverResponse, RemoveMemberRequest,
    SharedPetResponse, SharedPetsResponse, parse_single,
};
use crate::error::{ApiJson, ApiQuery, ApiResult};
use crate::state::AppState;

pub async fn invite_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<InviteRequest>,
) -> ApiResult<(StatusCode, Json<InviteResponse>)> {
    let input = InviteMemberInput::try_from(payload)?;

    state
        .rate_limit_service
        .check_rate_limit(&RateLimitRule::INVITE, actor.id().to_string().as_str())
        .await?;

    let membership = state.membership_service.invite_member(&actor, input).await?;
    let message = format!("member added as {}", membership.role.as_str());

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse {
            message,
            membership: MembershipResponse::from(membership),
        }),
    ))
}

pub async fn list_members_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiQuery(query): ApiQuery<MembersQuery>,
) -> ApiResult<Json<MembersResponse>> {
    let recipient_id = parse_single(
        "recipientId",
        RecipientId::parse(query.recipient_id.as_str()),
    )?;

    let circle = state
        .membership_service
        .list_members(&actor, recipient_id)
        .await?;

    Ok(Json(MembersResponse::from(circle)))
}

pub async fn remove_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<RemoveMemberRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (recipient_id, membership_id) = payload.parse()?;

    state
        .membership_service
        .remove_member(&actor, recipient_id, membership_id)
        .await?;

    Ok(Json(MessageResponse::new("member removed")))
}

pub async fn remove_caregiver_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(payload): ApiJson<RemoveCaregiverRequest>,
) -> ApiResult<Json<RemoveCaregiverResponse>> {
    let (recipient_id, user_id) = payload.parse()?;

    let removed = state
        .membership_service
        .remove_caregiver(&actor, recipient_id, user_id)
        .await?;

    let message = if removed == 0 {
        "no caregiver membership matched"
    } else {
        "caregiver removed"
    };

    Ok(Json(RemoveCaregiverResponse {
        message: message.to_owned(),
        removed,
    }))
}

pub async fn shared_pets_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<SharedPetsResponse>> {
    let shared_pets: Vec<SharedPetResponse> = state
        .membership_service
        .shared_recipients_for_user(actor.id())
        .await?
        .into_iter()
        .map(SharedPetResponse::from)
        .collect();

    Ok(Json(SharedPetsResponse {
        count: shared_pets.len(),
        shared_pets,
    }))
}
