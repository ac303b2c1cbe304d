use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{self, EmailMessage, JobOutcome, Loan, NotificationJob};
use crate::ports::{self, BookRepository, JobHandler, LoanRepository, Mailer, MemberRepository};

/// 通知ジョブ実行のエラー
///
/// いずれもタスクランナーのリトライ対象。
/// 対象が消えていた場合はエラーではなく`JobOutcome::BenignNoop`になる。
#[derive(Debug, Error)]
pub enum DispatchError {
    /// メッセージの送信に失敗した
    #[error("Delivery failed to {recipient}")]
    DeliveryFailed {
        recipient: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 貸出・会員・書籍の読み込みに失敗した
    #[error("Repository error while dispatching")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 通知ディスパッチャー
///
/// ジョブのペイロード（貸出ID）から実行時点の状態を読み直し、メッセージを組み立てて送る。
/// 登録時点の状態とは一致しない前提で動く。
#[derive(Clone)]
pub struct NotificationDispatcher {
    pub books: Arc<dyn BookRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub loans: Arc<dyn LoanRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub from_address: String,
}

impl NotificationDispatcher {
    /// ジョブを`now`時点の状態で実行する
    pub async fn dispatch(
        &self,
        job: NotificationJob,
        now: DateTime<Utc>,
    ) -> Result<JobOutcome, DispatchError> {
        let Some(loan) = self
            .loans
            .get(job.loan_id())
            .await
            .map_err(DispatchError::RepositoryError)?
        else {
            tracing::debug!(
                job = job.kind(),
                loan_id = %job.loan_id().value(),
                "Loan no longer exists, skipping notification"
            );
            return Ok(JobOutcome::BenignNoop);
        };

        // 延滞通知は実行時点でもまだ延滞している貸出だけが対象
        if matches!(job, NotificationJob::OverdueNotice { .. })
            && !domain::loan::is_overdue(&loan, now)
        {
            tracing::debug!(
                loan_id = %loan.loan_id.value(),
                "Loan is no longer overdue, skipping notice"
            );
            return Ok(JobOutcome::BenignNoop);
        }

        let Some(message) = self.compose(job, &loan).await? else {
            return Ok(JobOutcome::BenignNoop);
        };

        self.mailer
            .send(&message)
            .await
            .map_err(|source| DispatchError::DeliveryFailed {
                recipient: message.to.clone(),
                source,
            })?;

        tracing::info!(
            job = job.kind(),
            loan_id = %loan.loan_id.value(),
            recipient = %message.to,
            "Notification sent"
        );
        Ok(JobOutcome::Succeeded)
    }

    /// 会員・書籍が消えていた場合は`None`
    async fn compose(
        &self,
        job: NotificationJob,
        loan: &Loan,
    ) -> Result<Option<EmailMessage>, DispatchError> {
        let member = self
            .members
            .get(loan.member_id)
            .await
            .map_err(DispatchError::RepositoryError)?;
        let book = self
            .books
            .get(loan.book_id)
            .await
            .map_err(DispatchError::RepositoryError)?;

        let (Some(member), Some(book)) = (member, book) else {
            tracing::debug!(
                loan_id = %loan.loan_id.value(),
                "Member or book no longer exists, skipping notification"
            );
            return Ok(None);
        };

        let message = match job {
            NotificationJob::LoanCreated { .. } => {
                domain::loan_created_message(&self.from_address, loan, &member, &book)
            }
            NotificationJob::OverdueNotice { .. } => {
                domain::overdue_message(&self.from_address, loan, &member, &book)
            }
        };
        Ok(Some(message))
    }
}

#[async_trait]
impl JobHandler for NotificationDispatcher {
    async fn handle(&self, job: NotificationJob) -> ports::task_queue::Result<JobOutcome> {
        self.dispatch(job, Utc::now()).await.map_err(Into::into)
    }
}
