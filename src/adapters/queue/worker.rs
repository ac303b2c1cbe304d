use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::JobState;
use crate::ports::JobHandler;

use super::channel::QueuedJob;

/// リトライポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大試行回数（初回を含む）
    pub max_attempts: u32,
    /// 失敗から次の試行までの待ち時間
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// ワーカー設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// 同時に実行するジョブの最大数
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry: RetryPolicy::default(),
        }
    }
}

/// 通知ジョブのワーカー
///
/// チャネルからジョブを受け取り、`JobHandler`で実行する。
/// 1. 受信したジョブごとにタスクを起動（同時実行数はセマフォで制限）
/// 2. `Err`は失敗としてリトライポリシーに従い再試行
/// 3. `BenignNoop`・`Succeeded`は再試行しない
pub struct NotificationWorker {
    handler: Arc<dyn JobHandler>,
    config: WorkerConfig,
}

impl NotificationWorker {
    pub fn new(handler: Arc<dyn JobHandler>, config: WorkerConfig) -> Self {
        Self { handler, config }
    }

    /// チャネルが閉じるまでジョブを処理する
    ///
    /// 送信側がすべて破棄されると、実行中のジョブの完了を待ってから戻る。
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<QueuedJob>) {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        info!(
            concurrency = self.config.concurrency,
            max_attempts = self.config.retry.max_attempts,
            "Notification worker started"
        );

        while let Some(queued) = receiver.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };

            let handler = Arc::clone(&self.handler);
            let retry = self.config.retry;
            tasks.spawn(async move {
                let state = execute(handler.as_ref(), queued, &retry).await;
                drop(permit);
                state
            });

            while let Some(result) = tasks.try_join_next() {
                log_join_result(result);
            }
        }

        while let Some(result) = tasks.join_next().await {
            log_join_result(result);
        }

        info!("Notification worker stopped");
    }
}

/// 1件のジョブを最終状態になるまで実行する
///
/// `Enqueued → Running → {Succeeded, Failed, BenignNoop}`
pub async fn execute(handler: &dyn JobHandler, queued: QueuedJob, retry: &RetryPolicy) -> JobState {
    let job = queued.job;
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = queued.attempt.max(1);

    loop {
        debug!(
            job = job.kind(),
            loan_id = %job.loan_id().value(),
            attempt,
            state = ?JobState::Running,
            "Running job"
        );

        match handler.handle(job).await {
            Ok(outcome) => {
                let state = JobState::from(outcome);
                debug!(
                    job = job.kind(),
                    loan_id = %job.loan_id().value(),
                    attempt,
                    state = ?state,
                    "Job finished"
                );
                return state;
            }
            Err(e) if attempt >= max_attempts => {
                error!(
                    job = job.kind(),
                    loan_id = %job.loan_id().value(),
                    attempt,
                    error = %e,
                    "Job failed, no attempts left"
                );
                return JobState::Failed;
            }
            Err(e) => {
                warn!(
                    job = job.kind(),
                    loan_id = %job.loan_id().value(),
                    attempt,
                    error = %e,
                    "Job failed, retrying"
                );
                tokio::time::sleep(retry.backoff).await;
                attempt += 1;
            }
        }
    }
}

fn log_join_result(result: Result<JobState, tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Notification job task panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobOutcome, LoanId, NotificationJob};
    use crate::ports::task_queue::Result as HandlerResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 指定回数だけ失敗し、その後`outcome`を返すハンドラー
    struct FlakyHandler {
        failures_before_success: u32,
        outcome: JobOutcome,
        calls: AtomicU32,
    }

    impl FlakyHandler {
        fn new(failures_before_success: u32, outcome: JobOutcome) -> Self {
            Self {
                failures_before_success,
                outcome,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl JobHandler for FlakyHandler {
        async fn handle(&self, _job: NotificationJob) -> HandlerResult<JobOutcome> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err("smtp unavailable".into())
            } else {
                Ok(self.outcome)
            }
        }
    }

    fn queued() -> QueuedJob {
        QueuedJob {
            job: NotificationJob::LoanCreated {
                loan_id: LoanId::new(),
            },
            attempt: 1,
        }
    }

    fn retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_execute_succeeds_first_try() {
        let handler = FlakyHandler::new(0, JobOutcome::Succeeded);
        let state = execute(&handler, queued(), &retry(3)).await;

        assert_eq!(state, JobState::Succeeded);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_retries_until_success() {
        let handler = FlakyHandler::new(2, JobOutcome::Succeeded);
        let state = execute(&handler, queued(), &retry(3)).await;

        assert_eq!(state, JobState::Succeeded);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_fails_after_max_attempts() {
        let handler = FlakyHandler::new(10, JobOutcome::Succeeded);
        let state = execute(&handler, queued(), &retry(3)).await;

        assert_eq!(state, JobState::Failed);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_benign_noop_is_not_retried() {
        let handler = FlakyHandler::new(0, JobOutcome::BenignNoop);
        let state = execute(&handler, queued(), &retry(3)).await;

        assert_eq!(state, JobState::BenignNoop);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_drains_channel_and_stops() {
        let handler = Arc::new(FlakyHandler::new(0, JobOutcome::Succeeded));
        let (sender, receiver) = mpsc::unbounded_channel();
        for _ in 0..5 {
            sender.send(queued()).unwrap();
        }
        drop(sender);

        let worker = NotificationWorker::new(
            handler.clone(),
            WorkerConfig {
                concurrency: 2,
                retry: retry(1),
            },
        );
        worker.run(receiver).await;

        assert_eq!(handler.calls.load(Ordering::SeqCst), 5);
    }
}
