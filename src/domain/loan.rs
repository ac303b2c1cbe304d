use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, ExtendDueDateError, ExtensionDays, ExtensionError, LoanId, MemberId, ReturnLoanError,
};

/// 貸出期間の既定値（日数）
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出期間の上限（日数）
pub const MAX_LOAN_PERIOD_DAYS: i64 = 36_500;

/// 貸出ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    pub loan_period_days: i64,
}

impl LoanPolicy {
    pub fn due_date_for(&self, loan_date: DateTime<Utc>) -> DateTime<Utc> {
        loan_date + Duration::days(self.loan_period_days)
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
        }
    }
}

/// 貸出の状態（表示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// 貸出 - 1人の会員による1冊の書籍の1回の貸出
///
/// 不変条件：
/// - `is_returned == false` の貸出は書籍の貸出可能冊数を1冊分消費している
/// - `is_returned` は一度だけ true になり、同時に `return_date` が設定される
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<NaiveDate>,
    pub is_returned: bool,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        !self.is_returned
    }

    pub fn status(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.is_returned {
            LoanStatus::Returned
        } else if is_overdue(self, now) {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }
}

/// 純粋関数：新しい貸出を作成する
///
/// 返却期限はポリシーの貸出期間から決まる。
/// 蔵書数の減算は呼び出し側（リポジトリ）が同一トランザクションで行う。
pub fn open_loan(
    book_id: BookId,
    member_id: MemberId,
    loan_date: DateTime<Utc>,
    policy: &LoanPolicy,
) -> Loan {
    Loan {
        loan_id: LoanId::new(),
        book_id,
        member_id,
        loan_date,
        due_date: policy.due_date_for(loan_date),
        return_date: None,
        is_returned: false,
    }
}

/// 純粋関数：貸出を返却済みにする
pub fn return_loan(loan: &Loan, returned_on: NaiveDate) -> Result<Loan, ReturnLoanError> {
    if loan.is_returned {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(Loan {
        is_returned: true,
        return_date: Some(returned_on),
        ..loan.clone()
    })
}

/// 純粋関数：返却期限を延長する
///
/// ビジネスルール：
/// - 返却済みは延長不可
/// - 返却期限が`now`以前（延滞中）なら延長不可。延長日数より先に判定する
/// - 延長日数は0以上
pub fn extend_due_date(
    loan: &Loan,
    additional_days: i64,
    now: DateTime<Utc>,
) -> Result<Loan, ExtendDueDateError> {
    if loan.is_returned {
        return Err(ExtendDueDateError::AlreadyReturned);
    }

    if loan.due_date <= now {
        return Err(ExtendDueDateError::Overdue);
    }

    let days = ExtensionDays::try_from(additional_days)?;
    let due_date = loan
        .due_date
        .checked_add_signed(Duration::days(i64::from(days.value())))
        .ok_or(ExtensionError::TooLarge(additional_days))?;

    Ok(Loan {
        due_date,
        ..loan.clone()
    })
}

/// 純粋関数：延滞判定（返却期限ちょうども延滞に含む）
pub fn is_overdue(loan: &Loan, now: DateTime<Utc>) -> bool {
    !loan.is_returned && loan.due_date <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExtensionError;

    fn active_loan_due_in(days: i64) -> Loan {
        let now = Utc::now();
        Loan {
            loan_id: LoanId::new(),
            book_id: BookId::new(),
            member_id: MemberId::new(),
            loan_date: now - Duration::days(1),
            due_date: now + Duration::days(days),
            return_date: None,
            is_returned: false,
        }
    }

    #[test]
    fn test_open_loan_uses_policy_period() {
        let loan_date = Utc::now();
        let policy = LoanPolicy::default();

        let loan = open_loan(BookId::new(), MemberId::new(), loan_date, &policy);

        assert_eq!(loan.loan_date, loan_date);
        assert_eq!(loan.due_date, loan_date + Duration::days(14));
        assert!(!loan.is_returned);
        assert!(loan.return_date.is_none());
    }

    #[test]
    fn test_open_loan_with_custom_policy() {
        let loan_date = Utc::now();
        let policy = LoanPolicy {
            loan_period_days: 21,
        };

        let loan = open_loan(BookId::new(), MemberId::new(), loan_date, &policy);
        assert_eq!(loan.due_date, loan_date + Duration::days(21));
    }

    #[test]
    fn test_return_loan_sets_flag_and_date() {
        let loan = active_loan_due_in(3);
        let today = Utc::now().date_naive();

        let returned = return_loan(&loan, today).unwrap();

        assert!(returned.is_returned);
        assert_eq!(returned.return_date, Some(today));
        assert_eq!(returned.due_date, loan.due_date);
    }

    #[test]
    fn test_return_loan_only_once() {
        let today = Utc::now().date_naive();
        let returned = return_loan(&active_loan_due_in(3), today).unwrap();

        let result = return_loan(&returned, today);
        assert_eq!(result.unwrap_err(), ReturnLoanError::AlreadyReturned);
    }

    #[test]
    fn test_extend_due_date_adds_days() {
        let loan = active_loan_due_in(3);

        let extended = extend_due_date(&loan, 5, Utc::now()).unwrap();

        assert_eq!(extended.due_date, loan.due_date + Duration::days(5));
    }

    #[test]
    fn test_extend_due_date_zero_days_is_allowed() {
        let loan = active_loan_due_in(3);
        let extended = extend_due_date(&loan, 0, Utc::now()).unwrap();
        assert_eq!(extended.due_date, loan.due_date);
    }

    #[test]
    fn test_extend_due_date_rejects_negative_days() {
        let loan = active_loan_due_in(3);
        let result = extend_due_date(&loan, -1, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            ExtendDueDateError::InvalidExtension(ExtensionError::Negative(-1))
        );
    }

    #[test]
    fn test_extend_due_date_rejects_out_of_range_date() {
        let loan = active_loan_due_in(3);
        let days = i64::from(u32::MAX);
        let result = extend_due_date(&loan, days, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            ExtendDueDateError::InvalidExtension(ExtensionError::TooLarge(days))
        );
    }

    #[test]
    fn test_extend_due_date_rejects_overdue_loan() {
        let loan = active_loan_due_in(-2);
        let result = extend_due_date(&loan, 5, Utc::now());
        assert_eq!(result.unwrap_err(), ExtendDueDateError::Overdue);
    }

    #[test]
    fn test_extend_due_date_rejects_due_exactly_now() {
        let now = Utc::now();
        let loan = Loan {
            due_date: now,
            ..active_loan_due_in(1)
        };
        assert_eq!(
            extend_due_date(&loan, 1, now).unwrap_err(),
            ExtendDueDateError::Overdue
        );
    }

    #[test]
    fn test_extend_due_date_overdue_checked_before_negative_days() {
        let loan = active_loan_due_in(-2);
        let result = extend_due_date(&loan, -1, Utc::now());
        assert_eq!(result.unwrap_err(), ExtendDueDateError::Overdue);
    }

    #[test]
    fn test_extend_due_date_rejects_returned_loan() {
        let loan = return_loan(&active_loan_due_in(3), Utc::now().date_naive()).unwrap();
        let result = extend_due_date(&loan, 1, Utc::now());
        assert_eq!(result.unwrap_err(), ExtendDueDateError::AlreadyReturned);
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();
        assert!(!is_overdue(&active_loan_due_in(1), now));
        assert!(is_overdue(&active_loan_due_in(-1), now));

        let returned = return_loan(&active_loan_due_in(-1), now.date_naive()).unwrap();
        assert!(!is_overdue(&returned, now));
    }

    #[test]
    fn test_loan_status() {
        let now = Utc::now();
        assert_eq!(active_loan_due_in(1).status(now), LoanStatus::Active);
        assert_eq!(active_loan_due_in(-1).status(now), LoanStatus::Overdue);

        let returned = return_loan(&active_loan_due_in(1), now.date_naive()).unwrap();
        assert_eq!(returned.status(now), LoanStatus::Returned);
    }

    #[test]
    fn test_loan_status_from_str() {
        assert_eq!("overdue".parse::<LoanStatus>().unwrap(), LoanStatus::Overdue);
        assert!("lost".parse::<LoanStatus>().is_err());
    }
}
