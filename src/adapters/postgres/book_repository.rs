use crate::domain::{Book, BookId};
use crate::ports::book_repository::{
    BookChanges, BookRepository as BookRepositoryTrait, Result, UpdateBookOutcome,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::rows::{BOOK_COLUMNS, copies_to_i32, map_row_to_book};

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = $1");
        let row = sqlx::query(&sql)
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY title, book_id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn create(&self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (
                book_id,
                title,
                author_id,
                isbn,
                genre,
                total_copies,
                available_copies,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(book.author_id.value())
        .bind(&book.isbn)
        .bind(&book.genre)
        .bind(copies_to_i32(book.copies.total(), "total_copies")?)
        .bind(copies_to_i32(book.copies.available(), "available_copies")?)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// カタログ情報と総冊数を更新する
    ///
    /// 貸出可能冊数は現在の行の値から差分で求めるため、貸出・返却の
    /// 条件付きUPDATEと同じ行ロックの下で貸出中の冊数が維持される。
    async fn update(&self, book_id: BookId, changes: &BookChanges) -> Result<UpdateBookOutcome> {
        let total = copies_to_i32(changes.total_copies, "total_copies")?;
        let expected = changes
            .expected_available
            .map(|available| copies_to_i32(available, "available_copies"))
            .transpose()?;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE books
            SET title = $2,
                author_id = $3,
                isbn = $4,
                genre = $5,
                total_copies = $6,
                available_copies = available_copies + ($6 - total_copies),
                updated_at = $7
            WHERE book_id = $1
              AND available_copies + ($6 - total_copies) >= 0
              AND ($8::INTEGER IS NULL OR available_copies + ($6 - total_copies) = $8)
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(book_id.value())
            .bind(&changes.title)
            .bind(changes.author_id.value())
            .bind(&changes.isbn)
            .bind(&changes.genre)
            .bind(total)
            .bind(changes.updated_at)
            .bind(expected)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(row) = row {
            let book = map_row_to_book(&row)?;
            tx.commit().await?;
            return Ok(UpdateBookOutcome::Updated(book));
        }

        let current = sqlx::query(
            "SELECT total_copies, available_copies FROM books WHERE book_id = $1",
        )
        .bind(book_id.value())
        .fetch_optional(&mut *tx)
        .await?;
        tx.rollback().await?;

        let Some(current) = current else {
            return Ok(UpdateBookOutcome::BookNotFound);
        };
        let current_total: i32 = current.get("total_copies");
        let current_available: i32 = current.get("available_copies");
        let on_loan = current_total - current_available;

        Ok(if total < on_loan {
            UpdateBookOutcome::TotalBelowOnLoan {
                on_loan: u32::try_from(on_loan)?,
            }
        } else {
            UpdateBookOutcome::AvailableMismatch {
                available: u32::try_from(total - on_loan)?,
            }
        })
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
