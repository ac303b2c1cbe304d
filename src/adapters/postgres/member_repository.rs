use crate::domain::{Member, MemberId, MemberLoanCount};
use crate::ports::member_repository::{MemberRepository as MemberRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::rows::{MEMBER_COLUMNS, invalid_data, map_row_to_member};

/// MemberRepositoryのPostgreSQL実装
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn get(&self, member_id: MemberId) -> Result<Option<Member>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = $1");
        let row = sqlx::query(&sql)
            .bind(member_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    async fn list(&self) -> Result<Vec<Member>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members ORDER BY joined_at, member_id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(map_row_to_member).collect())
    }

    async fn create(&self, member: &Member) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (member_id, username, email, joined_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(member.member_id.value())
        .bind(&member.username)
        .bind(&member.email)
        .bind(member.joined_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, member: &Member) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET username = $2, email = $3
            WHERE member_id = $1
            "#,
        )
        .bind(member.member_id.value())
        .bind(&member.username)
        .bind(&member.email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 会員を削除する
    ///
    /// 貸出中だった書籍の冊数を戻してから、外部キーのカスケードで貸出ごと削除する。
    async fn delete(&self, member_id: MemberId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE books AS b
            SET available_copies = b.available_copies + active.cnt,
                updated_at = NOW()
            FROM (
                SELECT book_id, COUNT(*)::INTEGER AS cnt
                FROM loans
                WHERE member_id = $1 AND is_returned = FALSE
                GROUP BY book_id
            ) AS active
            WHERE b.book_id = active.book_id
            "#,
        )
        .bind(member_id.value())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM members WHERE member_id = $1")
            .bind(member_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// 通算貸出件数の多い会員を取得（同数は会員IDの昇順）
    async fn top_by_loan_count(&self, limit: usize) -> Result<Vec<MemberLoanCount>> {
        let limit = i64::try_from(limit)
            .map_err(|_| invalid_data(format!("limit out of range: {}", limit)))?;

        let rows = sqlx::query(
            r#"
            SELECT
                m.member_id,
                m.username,
                m.email,
                m.joined_at,
                COUNT(l.loan_id) AS loan_count
            FROM members m
            LEFT JOIN loans l ON l.member_id = m.member_id
            GROUP BY m.member_id
            ORDER BY loan_count DESC, m.member_id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<MemberLoanCount> {
                let loan_count: i64 = row.get("loan_count");
                let loan_count = u64::try_from(loan_count)
                    .map_err(|_| invalid_data(format!("loan_count out of range: {}", loan_count)))?;
                Ok(MemberLoanCount {
                    member: map_row_to_member(row),
                    loan_count,
                })
            })
            .collect()
    }
}
