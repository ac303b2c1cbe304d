use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, Loan, LoanId, Member};

/// 通知ジョブ
///
/// ペイロードは貸出IDのみ。ハンドラーは実行時に最新の状態を読み直す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationJob {
    /// 貸出作成の通知
    LoanCreated { loan_id: LoanId },
    /// 延滞の通知
    OverdueNotice { loan_id: LoanId },
}

impl NotificationJob {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationJob::LoanCreated { .. } => "loan_created",
            NotificationJob::OverdueNotice { .. } => "overdue_notice",
        }
    }

    pub fn loan_id(&self) -> LoanId {
        match self {
            NotificationJob::LoanCreated { loan_id } | NotificationJob::OverdueNotice { loan_id } => {
                *loan_id
            }
        }
    }
}

/// ジョブの状態
///
/// `Enqueued → Running → {Succeeded, Failed, BenignNoop}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Enqueued,
    Running,
    Succeeded,
    Failed,
    /// 対象が既に存在しない等、何もせずに成功扱いで終了
    BenignNoop,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::BenignNoop
        )
    }
}

/// ジョブ実行の正常終了
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded,
    /// 対象が見つからない・既に条件を満たさない等で何もしなかった
    BenignNoop,
}

impl From<JobOutcome> for JobState {
    fn from(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Succeeded => JobState::Succeeded,
            JobOutcome::BenignNoop => JobState::BenignNoop,
        }
    }
}

/// 送信するメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub const LOAN_CREATED_SUBJECT: &str = "Book Loaned Successfully";
pub const OVERDUE_SUBJECT: &str = "Book loan overdue";

/// 純粋関数：貸出作成通知を組み立てる
pub fn loan_created_message(from: &str, loan: &Loan, member: &Member, book: &Book) -> EmailMessage {
    EmailMessage {
        from: from.to_string(),
        to: member.email.clone(),
        subject: LOAN_CREATED_SUBJECT.to_string(),
        body: format!(
            "Hello {},\n\nYou have successfully loaned \"{}\".\nPlease return it by the due date ({}).",
            member.username,
            book.title,
            format_due_date(loan.due_date)
        ),
    }
}

/// 純粋関数：延滞通知を組み立てる
pub fn overdue_message(from: &str, loan: &Loan, member: &Member, book: &Book) -> EmailMessage {
    EmailMessage {
        from: from.to_string(),
        to: member.email.clone(),
        subject: OVERDUE_SUBJECT.to_string(),
        body: format!(
            "Hello {}, your book \"{}\" is overdue. It was due on {}.",
            member.username,
            book.title,
            format_due_date(loan.due_date)
        ),
    }
}

fn format_due_date(due_date: DateTime<Utc>) -> String {
    due_date.format("%Y-%m-%d").to_string()
}
