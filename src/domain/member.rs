use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MemberId;

/// 会員
///
/// 貸出台帳からは読み取り専用。通知の宛先として`email`を使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub username: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

/// 会員ごとの貸出件数（返却済みを含む通算）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLoanCount {
    pub member: Member,
    pub loan_count: u64,
}
