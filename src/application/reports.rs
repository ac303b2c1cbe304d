use thiserror::Error;

use crate::domain::MemberLoanCount;
use crate::ports::MemberRepository;

/// 上位会員の既定件数
pub const DEFAULT_TOP_MEMBERS_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report query failed")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 貸出件数ランキングの結果
///
/// 会員が1人もいない場合は`Empty`。エラーとは区別される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopMembers {
    Empty,
    Ranked(Vec<MemberLoanCount>),
}

impl TopMembers {
    pub fn into_vec(self) -> Vec<MemberLoanCount> {
        match self {
            TopMembers::Empty => Vec::new(),
            TopMembers::Ranked(members) => members,
        }
    }
}

/// 通算貸出件数の多い会員を取得する（読み取り専用）
///
/// 件数の降順、同数は会員IDの昇順。返却済みの貸出も件数に含む。
pub async fn top_members_by_loans(
    members: &dyn MemberRepository,
    limit: usize,
) -> Result<TopMembers, ReportError> {
    let ranked = members
        .top_by_loan_count(limit)
        .await
        .map_err(ReportError::RepositoryError)?;

    if ranked.is_empty() {
        return Ok(TopMembers::Empty);
    }
    Ok(TopMembers::Ranked(ranked))
}
