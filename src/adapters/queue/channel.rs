use crate::domain::NotificationJob;
use crate::ports::task_queue::{Result, TaskQueue as TaskQueueTrait};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// キューに載ったジョブ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedJob {
    pub job: NotificationJob,
    /// 1始まりの試行回数
    pub attempt: u32,
}

/// tokio mpscチャネルによるTaskQueue実装
///
/// 送信側は上限なしのチャネルで、`enqueue`は待たずに戻る。
/// 受信側は`NotificationWorker`が保持する。
#[derive(Clone)]
pub struct ChannelTaskQueue {
    sender: mpsc::UnboundedSender<QueuedJob>,
}

impl ChannelTaskQueue {
    /// キューとワーカーに渡す受信側を作成
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QueuedJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl TaskQueueTrait for ChannelTaskQueue {
    async fn enqueue(&self, job: NotificationJob) -> Result<()> {
        self.sender
            .send(QueuedJob { job, attempt: 1 })
            .map_err(|_| "notification worker has shut down")?;

        tracing::debug!(
            job = job.kind(),
            loan_id = %job.loan_id().value(),
            "Job enqueued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoanId;

    #[tokio::test]
    async fn test_enqueue_delivers_first_attempt() {
        let (queue, mut receiver) = ChannelTaskQueue::new();
        let job = NotificationJob::LoanCreated {
            loan_id: LoanId::new(),
        };

        queue.enqueue(job).await.unwrap();

        let queued = receiver.recv().await.unwrap();
        assert_eq!(queued.job, job);
        assert_eq!(queued.attempt, 1);
    }

    #[tokio::test]
    async fn test_enqueue_fails_after_receiver_dropped() {
        let (queue, receiver) = ChannelTaskQueue::new();
        drop(receiver);

        let result = queue
            .enqueue(NotificationJob::OverdueNotice {
                loan_id: LoanId::new(),
            })
            .await;
        assert!(result.is_err());
    }
}
