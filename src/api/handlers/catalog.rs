use crate::application::catalog;
use crate::domain::{AuthorId, BookId};
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
    types::{AuthorRequest, AuthorResponse, BookRequest, BookResponse},
};

// ============================================================================
// Authors
// ============================================================================

pub async fn list_authors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AuthorResponse>>, ApiError> {
    let authors = catalog::list_authors(&state.service_deps).await?;
    Ok(Json(authors.into_iter().map(AuthorResponse::from).collect()))
}

pub async fn get_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<AuthorResponse>, ApiError> {
    let author = catalog::get_author(&state.service_deps, AuthorId::from_uuid(author_id)).await?;
    Ok(Json(author.into()))
}

pub async fn create_author(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AuthorRequest>,
) -> Result<(StatusCode, Json<AuthorResponse>), ApiError> {
    let author = catalog::create_author(&state.service_deps, req.into()).await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

pub async fn update_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<Uuid>,
    Json(req): Json<AuthorRequest>,
) -> Result<Json<AuthorResponse>, ApiError> {
    let author = catalog::update_author(
        &state.service_deps,
        AuthorId::from_uuid(author_id),
        req.into(),
    )
    .await?;
    Ok(Json(author.into()))
}

/// DELETE /authors/:id
///
/// 著者の書籍とその貸出も削除される。
pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_author(&state.service_deps, AuthorId::from_uuid(author_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Books
// ============================================================================

pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = catalog::list_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = catalog::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(Json(book.into()))
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = catalog::create_book(&state.service_deps, req.into()).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book =
        catalog::update_book(&state.service_deps, BookId::from_uuid(book_id), req.into()).await?;
    Ok(Json(book.into()))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
