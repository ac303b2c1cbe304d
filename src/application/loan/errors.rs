use thiserror::Error;

use crate::application::ErrorKind;

/// 貸出台帳アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 会員が存在しない
    #[error("Member does not exist.")]
    MemberNotFound,

    /// 貸出が存在しない
    #[error("Loan not found")]
    LoanNotFound,

    /// 書籍・会員の組に対する貸出中の貸出がない
    #[error("Active loan does not exist.")]
    ActiveLoanNotFound,

    /// 貸出可能な冊数がない
    #[error("No available copies.")]
    NoAvailableCopies,

    /// 返却期限を過ぎている
    #[error("Loan is overdue")]
    LoanOverdue,

    /// 既に返却済み
    #[error("Loan has already been returned")]
    LoanAlreadyReturned,

    /// 延長日数が不正
    #[error("Invalid extension: {0}")]
    InvalidExtension(String),

    /// 書籍リポジトリのエラー
    #[error("Book repository error")]
    BookRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 会員リポジトリのエラー
    #[error("Member repository error")]
    MemberRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 貸出リポジトリのエラー
    #[error("Loan repository error")]
    LoanRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LoanApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanApplicationError::BookNotFound
            | LoanApplicationError::MemberNotFound
            | LoanApplicationError::LoanNotFound
            | LoanApplicationError::ActiveLoanNotFound => ErrorKind::NotFound,
            LoanApplicationError::NoAvailableCopies
            | LoanApplicationError::LoanOverdue
            | LoanApplicationError::LoanAlreadyReturned
            | LoanApplicationError::InvalidExtension(_) => ErrorKind::PreconditionFailed,
            LoanApplicationError::BookRepositoryError(_)
            | LoanApplicationError::MemberRepositoryError(_)
            | LoanApplicationError::LoanRepositoryError(_) => ErrorKind::Infrastructure,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
