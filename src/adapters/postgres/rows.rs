use crate::domain::{
    Author, AuthorId, Book, BookId, Copies, Loan, LoanId, Member, MemberId,
};
use sqlx::{Row, postgres::PgRow};

pub(super) type Error = Box<dyn std::error::Error + Send + Sync>;

pub(super) fn invalid_data(message: String) -> Error {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

pub(super) const BOOK_COLUMNS: &str =
    "book_id, title, author_id, isbn, genre, total_copies, available_copies, created_at, updated_at";

pub(super) const LOAN_COLUMNS: &str =
    "loan_id, book_id, member_id, loan_date, due_date, return_date, is_returned";

pub(super) const MEMBER_COLUMNS: &str = "member_id, username, email, joined_at";

pub(super) fn map_row_to_author(row: &PgRow) -> Author {
    Author {
        author_id: AuthorId::from_uuid(row.get("author_id")),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        biography: row.get("biography"),
    }
}

/// PostgreSQLの行データをBookに変換する
///
/// INTEGER列の冊数をu32に変換し、`Copies`の不変条件を検証する。
pub(super) fn map_row_to_book(row: &PgRow) -> Result<Book, Error> {
    let total_i32: i32 = row.get("total_copies");
    let available_i32: i32 = row.get("available_copies");

    let total = u32::try_from(total_i32)
        .map_err(|_| invalid_data(format!("total_copies out of range: {}", total_i32)))?;
    let available = u32::try_from(available_i32)
        .map_err(|_| invalid_data(format!("available_copies out of range: {}", available_i32)))?;
    let copies =
        Copies::with_available(total, available).map_err(|e| invalid_data(e.to_string()))?;

    Ok(Book {
        book_id: BookId::from_uuid(row.get("book_id")),
        title: row.get("title"),
        author_id: AuthorId::from_uuid(row.get("author_id")),
        isbn: row.get("isbn"),
        genre: row.get("genre"),
        copies,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub(super) fn map_row_to_member(row: &PgRow) -> Member {
    Member {
        member_id: MemberId::from_uuid(row.get("member_id")),
        username: row.get("username"),
        email: row.get("email"),
        joined_at: row.get("joined_at"),
    }
}

pub(super) fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        member_id: MemberId::from_uuid(row.get("member_id")),
        loan_date: row.get("loan_date"),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
        is_returned: row.get("is_returned"),
    }
}

pub(super) fn copies_to_i32(value: u32, column: &str) -> Result<i32, Error> {
    i32::try_from(value).map_err(|_| invalid_data(format!("{} out of range: {}", column, value)))
}
