use chrono::{DateTime, Utc};

use crate::domain::{LoanId, NotificationJob};

use super::errors::{LoanApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 延滞スイープで登録できなかった通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub loan_id: LoanId,
    pub error: String,
}

/// 延滞スイープの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 延滞として検出した貸出の件数
    pub overdue: usize,
    /// 延滞通知ジョブを登録した貸出
    pub enqueued: Vec<LoanId>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 延滞スイープ
///
/// 定期的に実行され、`now`時点で延滞している貸出ごとに延滞通知ジョブを登録する。
///
/// ビジネスルール：
/// - 対象は`is_returned = false`かつ`due_date <= now`の貸出
/// - 貸出の状態は変更しない（通知のきっかけのみ）
/// - 1件の登録失敗で残りの処理を中断しない。失敗はレポートに集めてログに出す
///
/// # エラー
/// 延滞貸出の検索自体に失敗した場合のみ
pub async fn overdue_sweep(deps: &ServiceDependencies, now: DateTime<Utc>) -> Result<SweepReport> {
    let overdue_loans = deps
        .loans
        .find_overdue(now)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?;

    let mut report = SweepReport {
        overdue: overdue_loans.len(),
        ..SweepReport::default()
    };

    for loan in overdue_loans {
        let job = NotificationJob::OverdueNotice {
            loan_id: loan.loan_id,
        };

        match deps.task_queue.enqueue(job).await {
            Ok(()) => report.enqueued.push(loan.loan_id),
            Err(e) => report.failures.push(SweepFailure {
                loan_id: loan.loan_id,
                error: e.to_string(),
            }),
        }
    }

    log_report(&report);
    Ok(report)
}

fn log_report(report: &SweepReport) {
    for failure in &report.failures {
        tracing::warn!(
            loan_id = %failure.loan_id.value(),
            error = %failure.error,
            "Failed to enqueue overdue notice"
        );
    }

    if report.is_clean() {
        tracing::info!(
            overdue = report.overdue,
            enqueued = report.enqueued.len(),
            "Overdue sweep completed"
        );
    } else {
        tracing::warn!(
            overdue = report.overdue,
            enqueued = report.enqueued.len(),
            failed = report.failures.len(),
            "Overdue sweep completed with failures"
        );
    }
}
