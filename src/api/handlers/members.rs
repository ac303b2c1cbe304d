use crate::application::membership;
use crate::application::reports::{DEFAULT_TOP_MEMBERS_LIMIT, top_members_by_loans};
use crate::domain::MemberId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    types::{MemberRequest, MemberResponse, MemberWithLoanCountResponse},
};

pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = membership::list_members(&state.service_deps).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member =
        membership::get_member(&state.service_deps, MemberId::from_uuid(member_id)).await?;
    Ok(Json(member.into()))
}

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let member = membership::create_member(&state.service_deps, req.into()).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = membership::update_member(
        &state.service_deps,
        MemberId::from_uuid(member_id),
        req.into(),
    )
    .await?;
    Ok(Json(member.into()))
}

/// DELETE /members/:id
///
/// 会員の貸出も削除され、貸出中だった冊数は書籍に戻る。
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    membership::delete_member(&state.service_deps, MemberId::from_uuid(member_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /members_with_most_loans - 通算貸出件数の上位会員
///
/// 会員がいない場合は空配列を返す（エラーではない）。
pub async fn members_with_most_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberWithLoanCountResponse>>, ApiError> {
    let ranked = top_members_by_loans(
        state.service_deps.members.as_ref(),
        DEFAULT_TOP_MEMBERS_LIMIT,
    )
    .await?;

    Ok(Json(
        ranked
            .into_vec()
            .into_iter()
            .map(MemberWithLoanCountResponse::from)
            .collect(),
    ))
}
