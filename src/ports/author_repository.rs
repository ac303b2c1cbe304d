use crate::domain::{Author, AuthorId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 著者リポジトリポート
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn get(&self, author_id: AuthorId) -> Result<Option<Author>>;

    async fn list(&self) -> Result<Vec<Author>>;

    async fn create(&self, author: &Author) -> Result<()>;

    /// 既存の著者を上書きする。存在しない場合は false
    async fn update(&self, author: &Author) -> Result<bool>;

    /// 著者と、その著者の書籍・貸出を削除する。存在しない場合は false
    async fn delete(&self, author_id: AuthorId) -> Result<bool>;
}
