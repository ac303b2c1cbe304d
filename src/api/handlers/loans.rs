use crate::application::loan as loan_service;
use crate::domain::commands::{CreateLoan, ExtendDueDate, ReturnLoan};
use crate::domain::{BookId, LoanId, MemberId};
use crate::domain::LoanStatus;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    types::{
        ExtendDueDateRequest, ListLoansQuery, LoanBookRequest, LoanResponse, ReturnBookRequest,
    },
};

/// POST /books/:id/loan - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること
/// - 貸出可能冊数が1以上であること
/// - 会員が存在すること
///
/// 貸出作成の通知はバックグラウンドで送られる。
pub async fn loan_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<LoanBookRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let now = Utc::now();
    let cmd = CreateLoan {
        book_id: BookId::from_uuid(book_id),
        member_id: MemberId::from_uuid(req.member_id),
        loaned_at: now,
    };

    let loan = loan_service::create_loan(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from_loan(loan, now))))
}

/// POST /books/:id/return_book - 書籍を返却する
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<ReturnBookRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let now = Utc::now();
    let cmd = ReturnLoan {
        book_id: BookId::from_uuid(book_id),
        member_id: MemberId::from_uuid(req.member_id),
        returned_at: now,
    };

    let loan = loan_service::return_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from_loan(loan, now)))
}

/// POST /loans/:id/extend_due_date - 返却期限を延長する
///
/// 強制されるビジネスルール:
/// - 貸出が返却済みでないこと
/// - 延滞していないこと
/// - 延長日数が0以上であること
pub async fn extend_due_date(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    Json(req): Json<ExtendDueDateRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let now = Utc::now();
    let cmd = ExtendDueDate {
        loan_id: LoanId::from_uuid(loan_id),
        additional_days: req.additional_days,
        requested_at: now,
    };

    let loan = loan_service::extend_due_date(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from_loan(loan, now)))
}

/// GET /loans - オプションフィルタ付き貸出一覧取得
///
/// クエリパラメータ:
/// - member_id: 会員IDでフィルタリング（オプション）
/// - status: ステータスでフィルタリング（active, overdue, returned）（オプション）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<LoanStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;
    let member_id = query.member_id.map(MemberId::from_uuid);

    let now = Utc::now();
    let loans = loan_service::list_loans(&state.service_deps).await?;

    Ok(Json(
        loans
            .into_iter()
            .filter(|loan| member_id.is_none_or(|id| loan.member_id == id))
            .filter(|loan| status.is_none_or(|s| loan.status(now) == s))
            .map(|loan| LoanResponse::from_loan(loan, now))
            .collect(),
    ))
}

/// GET /loans/:id
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = loan_service::get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;

    Ok(Json(LoanResponse::from_loan(loan, Utc::now())))
}

/// DELETE /loans/:id
///
/// 貸出中の貸出を削除した場合は貸出可能冊数が戻る。
pub async fn delete_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    loan_service::delete_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
