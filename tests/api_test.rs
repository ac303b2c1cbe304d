use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use rusty_library_loans::api::handlers::AppState;
use rusty_library_loans::api::router::create_router;
use rusty_library_loans::api::types::*;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::*;

// ============================================================================
// APIテスト用のヘルパー関数
// ============================================================================

fn app(ctx: &TestContext) -> axum::Router {
    create_router(Arc::new(AppState {
        service_deps: ctx.deps.clone(),
    }))
}

async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

// ============================================================================
// テスト
// ============================================================================

#[tokio::test]
async fn test_health() {
    let ctx = setup();
    let response = app(&ctx)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_loan_flow_over_http() {
    let ctx = setup();

    let (status, author) = send(
        app(&ctx),
        "POST",
        "/authors",
        Some(json!({"first_name": "Ursula", "last_name": "Le Guin"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let author: AuthorResponse = serde_json::from_value(author).unwrap();

    let (status, book) = send(
        app(&ctx),
        "POST",
        "/books",
        Some(json!({
            "title": "A Wizard of Earthsea",
            "author_id": author.author_id,
            "isbn": "9780547773742",
            "total_copies": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let book: BookResponse = serde_json::from_value(book).unwrap();
    assert_eq!(book.available_copies, 1);

    let (_, alice) = send(
        app(&ctx),
        "POST",
        "/members",
        Some(json!({"username": "alice", "email": "alice@example.com"})),
    )
    .await;
    let alice: MemberResponse = serde_json::from_value(alice).unwrap();
    let (_, bob) = send(
        app(&ctx),
        "POST",
        "/members",
        Some(json!({"username": "bob", "email": "bob@example.com"})),
    )
    .await;
    let bob: MemberResponse = serde_json::from_value(bob).unwrap();

    // alice が最後の1冊を借りる
    let (status, loan) = send(
        app(&ctx),
        "POST",
        &format!("/books/{}/loan", book.book_id),
        Some(json!({"member_id": alice.member_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let loan: LoanResponse = serde_json::from_value(loan).unwrap();
    assert_eq!(loan.status, "active");
    assert!(!loan.is_returned);

    // bob は借りられない
    let (status, body) = send(
        app(&ctx),
        "POST",
        &format!("/books/{}/loan", book.book_id),
        Some(json!({"member_id": bob.member_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No available copies."}));

    // 延長
    let (status, extended) = send(
        app(&ctx),
        "POST",
        &format!("/loans/{}/extend_due_date", loan.loan_id),
        Some(json!({"additional_days": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let extended: LoanResponse = serde_json::from_value(extended).unwrap();
    assert_eq!(extended.due_date, loan.due_date + Duration::days(5));

    // 返却
    let (status, returned) = send(
        app(&ctx),
        "POST",
        &format!("/books/{}/return_book", book.book_id),
        Some(json!({"member_id": alice.member_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let returned: LoanResponse = serde_json::from_value(returned).unwrap();
    assert!(returned.is_returned);
    assert_eq!(returned.status, "returned");
    assert_eq!(returned.return_date, Some(Utc::now().date_naive()));

    let (_, book_after) = send(app(&ctx), "GET", &format!("/books/{}", book.book_id), None).await;
    let book_after: BookResponse = serde_json::from_value(book_after).unwrap();
    assert_eq!(book_after.available_copies, 1);

    let (status, loans) = send(app(&ctx), "GET", "/loans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_loan_for_unknown_member_is_not_found() {
    let ctx = setup();
    let book = seed_book(&ctx.deps, "The Lathe of Heaven", 1).await;

    let (status, body) = send(
        app(&ctx),
        "POST",
        &format!("/books/{}/loan", book.book_id.value()),
        Some(json!({"member_id": uuid::Uuid::new_v4()})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Member does not exist."}));
}

#[tokio::test]
async fn test_return_without_active_loan_is_not_found() {
    let ctx = setup();
    let book = seed_book(&ctx.deps, "The Compass Rose", 1).await;
    let member = seed_member(&ctx.deps, "alice").await;

    let (status, body) = send(
        app(&ctx),
        "POST",
        &format!("/books/{}/return_book", book.book_id.value()),
        Some(json!({"member_id": member.member_id.value()})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Active loan does not exist."}));
}

#[tokio::test]
async fn test_extend_rejections() {
    let ctx = setup();
    let book = seed_book(&ctx.deps, "The Wind's Twelve Quarters", 2).await;
    let member = seed_member(&ctx.deps, "alice").await;
    let current = loan_at(&ctx.deps, &book, &member, Utc::now()).await;
    let overdue = loan_at(&ctx.deps, &book, &member, Utc::now() - Duration::days(20)).await;

    let (status, _) = send(
        app(&ctx),
        "POST",
        &format!("/loans/{}/extend_due_date", current.loan_id.value()),
        Some(json!({"additional_days": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(&ctx),
        "POST",
        &format!("/loans/{}/extend_due_date", overdue.loan_id.value()),
        Some(json!({"additional_days": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Loan is overdue"}));

    let (status, _) = send(
        app(&ctx),
        "POST",
        &format!("/loans/{}/extend_due_date", uuid::Uuid::new_v4()),
        Some(json!({"additional_days": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_members_with_most_loans() {
    let ctx = setup();

    let (status, body) = send(app(&ctx), "GET", "/members_with_most_loans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let book = seed_book(&ctx.deps, "Searoad", 5).await;
    let alice = seed_member(&ctx.deps, "alice").await;
    let bob = seed_member(&ctx.deps, "bob").await;
    loan_at(&ctx.deps, &book, &bob, Utc::now()).await;
    loan_at(&ctx.deps, &book, &bob, Utc::now()).await;
    loan_at(&ctx.deps, &book, &alice, Utc::now()).await;

    let (status, body) = send(app(&ctx), "GET", "/members_with_most_loans", None).await;
    assert_eq!(status, StatusCode::OK);

    let ranked: Vec<MemberWithLoanCountResponse> = serde_json::from_value(body).unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].member.username, "bob");
    assert_eq!(ranked[0].loan_count, 2);
    assert_eq!(ranked[1].member.username, "alice");
    assert_eq!(ranked[1].loan_count, 1);
}

#[tokio::test]
async fn test_delete_and_get_missing_resources() {
    let ctx = setup();
    let member = seed_member(&ctx.deps, "alice").await;

    let (status, _) = send(
        app(&ctx),
        "DELETE",
        &format!("/members/{}", member.member_id.value()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        app(&ctx),
        "GET",
        &format!("/members/{}", member.member_id.value()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Member not found"}));

    let (status, _) = send(
        app(&ctx),
        "GET",
        &format!("/loans/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_member_is_bad_request() {
    let ctx = setup();

    let (status, body) = send(
        app(&ctx),
        "POST",
        "/members",
        Some(json!({"username": "carol", "email": "not-an-email"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid member"));
}

#[tokio::test]
async fn test_list_loans_filters() {
    let ctx = setup();
    let book = seed_book(&ctx.deps, "Worlds of Exile and Illusion", 3).await;
    let alice = seed_member(&ctx.deps, "alice").await;
    let bob = seed_member(&ctx.deps, "bob").await;
    loan_at(&ctx.deps, &book, &alice, Utc::now()).await;
    loan_at(&ctx.deps, &book, &alice, Utc::now() - Duration::days(20)).await;
    loan_at(&ctx.deps, &book, &bob, Utc::now()).await;

    let (status, body) = send(
        app(&ctx),
        "GET",
        &format!("/loans?member_id={}", alice.member_id.value()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(app(&ctx), "GET", "/loans?status=overdue", None).await;
    let overdue: Vec<LoanResponse> = serde_json::from_value(body).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].member_id, alice.member_id.value());
    assert_eq!(overdue[0].status, "overdue");

    let (status, body) = send(app(&ctx), "GET", "/loans?status=lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid loan status: lost"}));
}
