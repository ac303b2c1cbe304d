use chrono::Utc;
use thiserror::Error;

use crate::application::ErrorKind;
use crate::application::loan::ServiceDependencies;
use crate::domain::{Author, AuthorId, Book, BookId, Copies, CopiesError};
use crate::ports::book_repository::{BookChanges, UpdateBookOutcome};

/// カタログ（著者・書籍）操作のエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Author not found")]
    AuthorNotFound,

    #[error("Book not found")]
    BookNotFound,

    #[error("Invalid book: {0}")]
    InvalidBook(String),

    #[error("Invalid author: {0}")]
    InvalidAuthor(String),

    #[error("Catalog repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::AuthorNotFound | CatalogError::BookNotFound => ErrorKind::NotFound,
            CatalogError::InvalidBook(_) | CatalogError::InvalidAuthor(_) => {
                ErrorKind::PreconditionFailed
            }
            CatalogError::RepositoryError(_) => ErrorKind::Infrastructure,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// 著者の入力値（作成・更新共通）
#[derive(Debug, Clone)]
pub struct AuthorInput {
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
}

/// 書籍の入力値（作成・更新共通）
///
/// `available_copies`を省略した場合、作成時は総冊数と同じ、
/// 更新時は貸出中の冊数を維持した値になる。更新時に指定した値は
/// 導出値との照合にだけ使う。
#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub author_id: AuthorId,
    pub isbn: String,
    pub genre: Option<String>,
    pub total_copies: u32,
    pub available_copies: Option<u32>,
}

fn validate_author(input: &AuthorInput) -> Result<()> {
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(CatalogError::InvalidAuthor(
            "first_name and last_name are required".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_authors(deps: &ServiceDependencies) -> Result<Vec<Author>> {
    deps.authors
        .list()
        .await
        .map_err(CatalogError::RepositoryError)
}

pub async fn get_author(deps: &ServiceDependencies, author_id: AuthorId) -> Result<Author> {
    deps.authors
        .get(author_id)
        .await
        .map_err(CatalogError::RepositoryError)?
        .ok_or(CatalogError::AuthorNotFound)
}

pub async fn create_author(deps: &ServiceDependencies, input: AuthorInput) -> Result<Author> {
    validate_author(&input)?;

    let author = Author {
        author_id: AuthorId::new(),
        first_name: input.first_name,
        last_name: input.last_name,
        biography: input.biography,
    };

    deps.authors
        .create(&author)
        .await
        .map_err(CatalogError::RepositoryError)?;

    tracing::info!(author_id = %author.author_id.value(), "Author created");
    Ok(author)
}

pub async fn update_author(
    deps: &ServiceDependencies,
    author_id: AuthorId,
    input: AuthorInput,
) -> Result<Author> {
    validate_author(&input)?;

    let author = Author {
        author_id,
        first_name: input.first_name,
        last_name: input.last_name,
        biography: input.biography,
    };

    let updated = deps
        .authors
        .update(&author)
        .await
        .map_err(CatalogError::RepositoryError)?;

    if !updated {
        return Err(CatalogError::AuthorNotFound);
    }
    Ok(author)
}

pub async fn delete_author(deps: &ServiceDependencies, author_id: AuthorId) -> Result<()> {
    let deleted = deps
        .authors
        .delete(author_id)
        .await
        .map_err(CatalogError::RepositoryError)?;

    if !deleted {
        return Err(CatalogError::AuthorNotFound);
    }

    tracing::info!(author_id = %author_id.value(), "Author deleted");
    Ok(())
}

pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.books.list().await.map_err(CatalogError::RepositoryError)
}

pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.books
        .get(book_id)
        .await
        .map_err(CatalogError::RepositoryError)?
        .ok_or(CatalogError::BookNotFound)
}

/// 書籍を登録する
///
/// 著者が存在し、貸出可能冊数が総冊数以下であること。
pub async fn create_book(deps: &ServiceDependencies, input: BookInput) -> Result<Book> {
    ensure_author_exists(deps, input.author_id).await?;

    let copies = match input.available_copies {
        Some(available) => Copies::with_available(input.total_copies, available)
            .map_err(|e| CatalogError::InvalidBook(e.to_string()))?,
        None => Copies::new(input.total_copies),
    };

    let now = Utc::now();
    let book = Book {
        book_id: BookId::new(),
        title: input.title,
        author_id: input.author_id,
        isbn: input.isbn,
        genre: input.genre,
        copies,
        created_at: now,
        updated_at: now,
    };

    deps.books
        .create(&book)
        .await
        .map_err(CatalogError::RepositoryError)?;

    tracing::info!(
        book_id = %book.book_id.value(),
        total_copies = book.copies.total(),
        "Book created"
    );
    Ok(book)
}

/// 書籍を更新する
///
/// 貸出可能冊数は保存時点の貸出中の冊数から導出する。
/// `available_copies`を指定する場合は導出値と一致しなければならない。
/// 貸出中の冊数を下回る総冊数は受け付けない。
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    input: BookInput,
) -> Result<Book> {
    ensure_author_exists(deps, input.author_id).await?;

    let changes = BookChanges {
        title: input.title,
        author_id: input.author_id,
        isbn: input.isbn,
        genre: input.genre,
        total_copies: input.total_copies,
        expected_available: input.available_copies,
        updated_at: Utc::now(),
    };

    let outcome = deps
        .books
        .update(book_id, &changes)
        .await
        .map_err(CatalogError::RepositoryError)?;

    match outcome {
        UpdateBookOutcome::Updated(book) => {
            tracing::info!(
                book_id = %book.book_id.value(),
                total_copies = book.copies.total(),
                available_copies = book.copies.available(),
                "Book updated"
            );
            Ok(book)
        }
        UpdateBookOutcome::BookNotFound => Err(CatalogError::BookNotFound),
        UpdateBookOutcome::TotalBelowOnLoan { on_loan } => Err(CatalogError::InvalidBook(
            CopiesError::TotalBelowOnLoan {
                total: changes.total_copies,
                on_loan,
            }
            .to_string(),
        )),
        UpdateBookOutcome::AvailableMismatch { available } => {
            Err(CatalogError::InvalidBook(format!(
                "available_copies must equal total_copies minus the copies on loan ({})",
                available
            )))
        }
    }
}

pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let deleted = deps
        .books
        .delete(book_id)
        .await
        .map_err(CatalogError::RepositoryError)?;

    if !deleted {
        return Err(CatalogError::BookNotFound);
    }

    tracing::info!(book_id = %book_id.value(), "Book deleted");
    Ok(())
}

async fn ensure_author_exists(deps: &ServiceDependencies, author_id: AuthorId) -> Result<()> {
    deps.authors
        .get(author_id)
        .await
        .map_err(CatalogError::RepositoryError)?
        .map(|_| ())
        .ok_or(CatalogError::AuthorNotFound)
}
