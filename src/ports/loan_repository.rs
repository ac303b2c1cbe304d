use crate::domain::{Book, BookId, Loan, LoanId, MemberId};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出作成の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenLoanOutcome {
    /// 貸出を保存し、1冊減らした後の書籍
    Opened(Book),
    BookNotFound,
    /// 会員が存在しない（確認後に削除された場合を含む）
    MemberNotFound,
    NoAvailableCopies,
}

/// 貸出リポジトリポート
///
/// 貸出行の作成・返却と書籍の貸出可能冊数の増減を1つの単位として扱う。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 貸出を保存し、書籍の貸出可能冊数を1減らす
    ///
    /// 減算は`available_copies > 0`を条件とした条件付き更新で行い、
    /// 最後の1冊に対する同時貸出は片方だけが成功する。
    /// 減算と保存はどちらも行われるか、どちらも行われないかのいずれか。
    /// 会員が存在しない場合は何も変更せず`MemberNotFound`を返す。
    async fn open(&self, loan: &Loan) -> Result<OpenLoanOutcome>;

    /// 書籍・会員の組に対する貸出中の貸出を返却済みにし、貸出可能冊数を1増やす
    ///
    /// 該当する貸出がない場合は`None`。複数ある場合は最も古いものを返却する。
    async fn close_active(
        &self,
        book_id: BookId,
        member_id: MemberId,
        returned_on: NaiveDate,
    ) -> Result<Option<Loan>>;

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    async fn list(&self) -> Result<Vec<Loan>>;

    /// 貸出中の貸出の返却期限を更新する。該当しない場合は false
    async fn update_due_date(&self, loan_id: LoanId, due_date: DateTime<Utc>) -> Result<bool>;

    /// 貸出を削除する（貸出中なら冊数を戻す）。存在しない場合は false
    async fn delete(&self, loan_id: LoanId) -> Result<bool>;

    /// `is_returned = false` かつ `due_date <= now` の貸出を返却期限順に取得する
    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Loan>>;
}
