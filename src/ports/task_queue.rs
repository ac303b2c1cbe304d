use crate::domain::{JobOutcome, NotificationJob};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// タスクキューポート
///
/// `enqueue`はジョブを受け付けた時点で戻り、配信の完了を待たない。
/// ジョブは少なくとも1回実行される（再配信されうる）。
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, job: NotificationJob) -> Result<()>;
}

/// ジョブハンドラーポート
///
/// ワーカーが取り出したジョブを実行する。`Err`はリトライ対象の失敗、
/// `JobOutcome::BenignNoop`はリトライしない正常終了を表す。
/// 同じジョブが複数回渡されても安全であること。
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: NotificationJob) -> Result<JobOutcome>;
}
