use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Creates the API router
///
/// Loan ledger:
/// - POST /books/:id/loan - Loan a book to a member
/// - POST /books/:id/return_book - Return a member's active loan of a book
/// - POST /loans/:id/extend_due_date - Extend an active loan
/// - GET /loans, GET|DELETE /loans/:id
///
/// Catalog and members:
/// - /authors, /books, /members with standard CRUD
/// - GET /members_with_most_loans - Top members by lifetime loan count
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Loan ledger
        .route("/books/:id/loan", post(handlers::loan_book))
        .route("/books/:id/return_book", post(handlers::return_book))
        .route("/loans", get(handlers::list_loans))
        .route(
            "/loans/:id",
            get(handlers::get_loan).delete(handlers::delete_loan),
        )
        .route(
            "/loans/:id/extend_due_date",
            post(handlers::extend_due_date),
        )
        // Catalog
        .route(
            "/authors",
            get(handlers::list_authors).post(handlers::create_author),
        )
        .route(
            "/authors/:id",
            get(handlers::get_author)
                .put(handlers::update_author)
                .delete(handlers::delete_author),
        )
        .route(
            "/books",
            get(handlers::list_books).post(handlers::create_book),
        )
        .route(
            "/books/:id",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        // Members
        .route(
            "/members",
            get(handlers::list_members).post(handlers::create_member),
        )
        .route(
            "/members/:id",
            get(handlers::get_member)
                .put(handlers::update_member)
                .delete(handlers::delete_member),
        )
        .route(
            "/members_with_most_loans",
            get(handlers::members_with_most_loans),
        )
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
