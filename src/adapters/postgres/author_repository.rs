use crate::domain::{Author, AuthorId};
use crate::ports::author_repository::{AuthorRepository as AuthorRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::map_row_to_author;

/// AuthorRepositoryのPostgreSQL実装
pub struct AuthorRepository {
    pool: PgPool,
}

impl AuthorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorRepositoryTrait for AuthorRepository {
    async fn get(&self, author_id: AuthorId) -> Result<Option<Author>> {
        let row = sqlx::query(
            r#"
            SELECT author_id, first_name, last_name, biography
            FROM authors
            WHERE author_id = $1
            "#,
        )
        .bind(author_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_author))
    }

    async fn list(&self) -> Result<Vec<Author>> {
        let rows = sqlx::query(
            r#"
            SELECT author_id, first_name, last_name, biography
            FROM authors
            ORDER BY last_name, first_name, author_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_author).collect())
    }

    async fn create(&self, author: &Author) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO authors (author_id, first_name, last_name, biography)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(author.author_id.value())
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(&author.biography)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, author: &Author) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE authors
            SET first_name = $2, last_name = $3, biography = $4
            WHERE author_id = $1
            "#,
        )
        .bind(author.author_id.value())
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(&author.biography)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 書籍・貸出は外部キーのON DELETE CASCADEで削除される
    async fn delete(&self, author_id: AuthorId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE author_id = $1")
            .bind(author_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
