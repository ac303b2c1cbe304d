use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::catalog::{AuthorInput, BookInput};
use crate::application::membership::MemberInput;
use crate::domain::{Author, AuthorId, Book, Loan, Member, MemberLoanCount};

// ============================================================================
// Loans
// ============================================================================

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListLoansQuery {
    /// 会員IDでフィルタリング
    pub member_id: Option<Uuid>,
    /// ステータスでフィルタリング（active, overdue, returned）
    pub status: Option<String>,
}

/// POST /books/:id/loan
#[derive(Debug, Deserialize)]
pub struct LoanBookRequest {
    pub member_id: Uuid,
}

/// POST /books/:id/return_book
#[derive(Debug, Deserialize)]
pub struct ReturnBookRequest {
    pub member_id: Uuid,
}

/// POST /loans/:id/extend_due_date
///
/// 負の値もそのまま受け取り、アプリケーション層で検証する。
#[derive(Debug, Deserialize)]
pub struct ExtendDueDateRequest {
    pub additional_days: i64,
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<NaiveDate>,
    pub is_returned: bool,
    /// active, overdue, returned
    pub status: String,
}

impl LoanResponse {
    pub fn from_loan(loan: Loan, now: DateTime<Utc>) -> Self {
        Self {
            status: loan.status(now).as_str().to_string(),
            loan_id: loan.loan_id.value(),
            book_id: loan.book_id.value(),
            member_id: loan.member_id.value(),
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            is_returned: loan.is_returned,
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AuthorRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub biography: Option<String>,
}

impl From<AuthorRequest> for AuthorInput {
    fn from(req: AuthorRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            biography: req.biography,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub author_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            author_id: author.author_id.value(),
            first_name: author.first_name,
            last_name: author.last_name,
            biography: author.biography,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author_id: Uuid,
    pub isbn: String,
    #[serde(default)]
    pub genre: Option<String>,
    pub total_copies: u32,
    #[serde(default)]
    pub available_copies: Option<u32>,
}

impl From<BookRequest> for BookInput {
    fn from(req: BookRequest) -> Self {
        Self {
            title: req.title,
            author_id: AuthorId::from_uuid(req.author_id),
            isbn: req.isbn,
            genre: req.genre,
            total_copies: req.total_copies,
            available_copies: req.available_copies,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book_id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub isbn: String,
    pub genre: Option<String>,
    pub total_copies: u32,
    pub available_copies: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            title: book.title,
            author_id: book.author_id.value(),
            isbn: book.isbn,
            genre: book.genre,
            total_copies: book.copies.total(),
            available_copies: book.copies.available(),
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

// ============================================================================
// Members
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub username: String,
    pub email: String,
}

impl From<MemberRequest> for MemberInput {
    fn from(req: MemberRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub member_id: Uuid,
    pub username: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            member_id: member.member_id.value(),
            username: member.username,
            email: member.email,
            joined_at: member.joined_at,
        }
    }
}

/// GET /members_with_most_loans の要素
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberWithLoanCountResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub loan_count: u64,
}

impl From<MemberLoanCount> for MemberWithLoanCountResponse {
    fn from(ranked: MemberLoanCount) -> Self {
        Self {
            member: MemberResponse::from(ranked.member),
            loan_count: ranked.loan_count,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
