use thiserror::Error;

/// 蔵書数のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopiesError {
    /// 貸出可能な冊数がない
    #[error("No available copies.")]
    NoAvailableCopies,
    /// 全冊が書架にあり、返却を受け付けられない
    #[error("All copies are already on the shelf")]
    AllCopiesOnShelf,
    /// 貸出可能冊数が総冊数を超えている
    #[error("available_copies ({available}) exceeds total_copies ({total})")]
    AvailableExceedsTotal { total: u32, available: u32 },
    /// 総冊数が貸出中の冊数を下回る
    #[error("total_copies ({total}) is below the number of copies on loan ({on_loan})")]
    TotalBelowOnLoan { total: u32, on_loan: u32 },
}

/// 延長日数のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("additional_days must be zero or positive, got {0}")]
    Negative(i64),
    #[error("additional_days is too large: {0}")]
    TooLarge(i64),
}

/// 返却期限延長のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtendDueDateError {
    /// 既に返却済み
    #[error("Loan has already been returned")]
    AlreadyReturned,
    /// 返却期限を過ぎている
    #[error("Loan is overdue")]
    Overdue,
    /// 延長日数が不正
    #[error(transparent)]
    InvalidExtension(#[from] ExtensionError),
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnLoanError {
    /// 既に返却済み
    #[error("Loan has already been returned")]
    AlreadyReturned,
}
