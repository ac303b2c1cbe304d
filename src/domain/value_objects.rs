use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{CopiesError, ExtensionError};

/// 貸出ID - 貸出台帳の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

/// 書籍ID - カタログへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 会員ID - 会員名簿への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

/// 著者ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuthorId(Uuid);

impl AuthorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for AuthorId {
    fn default() -> Self {
        Self::new()
    }
}

/// 蔵書数
///
/// 不変条件：0 ≤ available ≤ total
/// 貸出で1冊減り、返却で1冊戻る。範囲外の値は作成できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copies {
    total: u32,
    available: u32,
}

impl Copies {
    /// 全冊が書架にある状態で作成
    pub fn new(total: u32) -> Self {
        Self {
            total,
            available: total,
        }
    }

    /// 総冊数と貸出可能冊数から作成
    ///
    /// # エラー
    /// available > total の場合は`CopiesError::AvailableExceedsTotal`を返す
    pub fn with_available(total: u32, available: u32) -> Result<Self, CopiesError> {
        if available > total {
            return Err(CopiesError::AvailableExceedsTotal { total, available });
        }
        Ok(Self { total, available })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    /// 貸出中の冊数
    pub fn on_loan(&self) -> u32 {
        self.total - self.available
    }

    /// 1冊貸し出す
    pub fn check_out(self) -> Result<Self, CopiesError> {
        if self.available == 0 {
            return Err(CopiesError::NoAvailableCopies);
        }
        Ok(Self {
            available: self.available - 1,
            ..self
        })
    }

    /// 1冊返却する
    pub fn check_in(self) -> Result<Self, CopiesError> {
        if self.available >= self.total {
            return Err(CopiesError::AllCopiesOnShelf);
        }
        Ok(Self {
            available: self.available + 1,
            ..self
        })
    }

    /// 総冊数を変更する（貸出中の冊数は維持）
    ///
    /// # エラー
    /// 新しい総冊数が貸出中の冊数を下回る場合はエラー
    pub fn resize(self, total: u32) -> Result<Self, CopiesError> {
        let on_loan = self.on_loan();
        if total < on_loan {
            return Err(CopiesError::TotalBelowOnLoan { total, on_loan });
        }
        Ok(Self {
            total,
            available: total - on_loan,
        })
    }
}

/// 延長日数
///
/// 不変条件：0以上
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDays(u32);

impl ExtensionDays {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for ExtensionDays {
    type Error = ExtensionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(ExtensionError::Negative(value));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| ExtensionError::TooLarge(value))
    }
}
