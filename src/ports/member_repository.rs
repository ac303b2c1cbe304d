use crate::domain::{Member, MemberId, MemberLoanCount};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員リポジトリポート
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn get(&self, member_id: MemberId) -> Result<Option<Member>>;

    async fn list(&self) -> Result<Vec<Member>>;

    async fn create(&self, member: &Member) -> Result<()>;

    /// 既存の会員を上書きする。存在しない場合は false
    async fn update(&self, member: &Member) -> Result<bool>;

    /// 会員と、その会員の貸出を削除する。存在しない場合は false
    async fn delete(&self, member_id: MemberId) -> Result<bool>;

    /// 通算貸出件数の多い会員を取得する
    ///
    /// 件数の降順、同数の場合は会員IDの昇順。貸出0件の会員も含む。
    async fn top_by_loan_count(&self, limit: usize) -> Result<Vec<MemberLoanCount>>;
}
