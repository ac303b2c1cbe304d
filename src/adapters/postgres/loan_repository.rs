use crate::domain::{Book, BookId, Loan, LoanId, MemberId};
use crate::ports::loan_repository::{
    LoanRepository as LoanRepositoryTrait, OpenLoanOutcome, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures::TryStreamExt;
use sqlx::{PgPool, Row};

use super::rows::{BOOK_COLUMNS, LOAN_COLUMNS, map_row_to_book, map_row_to_loan};

/// LoanRepositoryのPostgreSQL実装
///
/// 貸出行の変更と書籍の冊数の増減を1つのトランザクションで行う。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// 貸出を保存し、冊数を条件付きで1減らす
    ///
    /// `available_copies > 0`を条件にしたUPDATEが行ロックを取るため、
    /// 最後の1冊への同時貸出は片方のUPDATEが0行となり失敗する。
    async fn open(&self, loan: &Loan) -> Result<OpenLoanOutcome> {
        let mut tx = self.pool.begin().await?;

        // 会員行を共有ロックし、コミットまで削除されないようにする
        let member = sqlx::query("SELECT 1 FROM members WHERE member_id = $1 FOR KEY SHARE")
            .bind(loan.member_id.value())
            .fetch_optional(&mut *tx)
            .await?;
        if member.is_none() {
            tx.rollback().await?;
            return Ok(OpenLoanOutcome::MemberNotFound);
        }

        let sql = format!(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1, updated_at = $2
            WHERE book_id = $1 AND available_copies > 0
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(loan.book_id.value())
            .bind(loan.loan_date)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE book_id = $1)")
                    .bind(loan.book_id.value())
                    .fetch_one(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Ok(if exists {
                OpenLoanOutcome::NoAvailableCopies
            } else {
                OpenLoanOutcome::BookNotFound
            });
        };
        let book: Book = map_row_to_book(&row)?;

        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id,
                book_id,
                member_id,
                loan_date,
                due_date,
                return_date,
                is_returned
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.book_id.value())
        .bind(loan.member_id.value())
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.is_returned)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(OpenLoanOutcome::Opened(book))
    }

    /// 最も古い貸出中の貸出を返却済みにし、冊数を1戻す
    async fn close_active(
        &self,
        book_id: BookId,
        member_id: MemberId,
        returned_on: NaiveDate,
    ) -> Result<Option<Loan>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE loans
            SET is_returned = TRUE, return_date = $3
            WHERE loan_id = (
                SELECT loan_id
                FROM loans
                WHERE book_id = $1 AND member_id = $2 AND is_returned = FALSE
                ORDER BY loan_date ASC, loan_id ASC
                LIMIT 1
                FOR UPDATE
            )
            AND is_returned = FALSE
            RETURNING {LOAN_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(book_id.value())
            .bind(member_id.value())
            .bind(returned_on)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let loan = map_row_to_loan(&row);

        let restored = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies + 1, updated_at = NOW()
            WHERE book_id = $1 AND available_copies < total_copies
            "#,
        )
        .bind(book_id.value())
        .execute(&mut *tx)
        .await?;

        if restored.rows_affected() == 0 {
            tracing::warn!(
                loan_id = %loan.loan_id.value(),
                book_id = %book_id.value(),
                "All copies already on the shelf, returned loan did not restore a copy"
            );
        }

        tx.commit().await?;
        Ok(Some(loan))
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE loan_id = $1");
        let row = sqlx::query(&sql)
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    async fn list(&self) -> Result<Vec<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans ORDER BY loan_date, loan_id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }

    async fn update_due_date(&self, loan_id: LoanId, due_date: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET due_date = $2
            WHERE loan_id = $1 AND is_returned = FALSE
            "#,
        )
        .bind(loan_id.value())
        .bind(due_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, loan_id: LoanId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("DELETE FROM loans WHERE loan_id = $1 RETURNING book_id, is_returned")
            .bind(loan_id.value())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(false);
        };

        let is_returned: bool = row.get("is_returned");
        if !is_returned {
            let book_id: uuid::Uuid = row.get("book_id");
            sqlx::query(
                r#"
                UPDATE books
                SET available_copies = available_copies + 1, updated_at = NOW()
                WHERE book_id = $1 AND available_copies < total_copies
                "#,
            )
            .bind(book_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// 延滞中の貸出を返却期限順に取得
    ///
    /// (due_date) WHERE NOT is_returned の部分インデックスを使用する。
    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Loan>> {
        let sql = format!(
            r#"
            SELECT {LOAN_COLUMNS}
            FROM loans
            WHERE is_returned = FALSE AND due_date <= $1
            ORDER BY due_date ASC, loan_id ASC
            "#
        );
        let mut rows = sqlx::query(&sql).bind(now).fetch(&self.pool);

        let mut loans = Vec::new();
        while let Some(row) = rows.try_next().await? {
            loans.push(map_row_to_loan(&row));
        }
        Ok(loans)
    }
}
