use crate::domain::{AuthorId, Book, BookId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍の更新内容
///
/// 貸出可能冊数は指定せず、保存時点の貸出中の冊数から導出する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookChanges {
    pub title: String,
    pub author_id: AuthorId,
    pub isbn: String,
    pub genre: Option<String>,
    pub total_copies: u32,
    /// 指定時は、導出した貸出可能冊数がこの値と一致する場合だけ更新する
    pub expected_available: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

/// 書籍更新の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateBookOutcome {
    /// 更新後の書籍
    Updated(Book),
    BookNotFound,
    /// 総冊数が貸出中の冊数を下回る
    TotalBelowOnLoan { on_loan: u32 },
    /// `expected_available`が導出した貸出可能冊数と一致しない
    AvailableMismatch { available: u32 },
}

/// 書籍リポジトリポート
///
/// 貸出・返却に伴う貸出可能冊数の増減は`LoanRepository`が行う。
/// ここでの`update`はカタログ情報と総冊数の編集用。
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn get(&self, book_id: BookId) -> Result<Option<Book>>;

    async fn list(&self) -> Result<Vec<Book>>;

    async fn create(&self, book: &Book) -> Result<()>;

    /// カタログ情報と総冊数を更新する
    ///
    /// 貸出可能冊数は`total_copies - 貸出中の冊数`として、
    /// 貸出・返却と同じ排他の中で1回の操作で再計算する。
    async fn update(&self, book_id: BookId, changes: &BookChanges) -> Result<UpdateBookOutcome>;

    /// 書籍と、その書籍の貸出を削除する。存在しない場合は false
    async fn delete(&self, book_id: BookId) -> Result<bool>;
}
