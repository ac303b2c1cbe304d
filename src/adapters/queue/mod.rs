//! インプロセスのタスクキュー
//!
//! ```text
//! ChannelTaskQueue::enqueue ──► mpsc ──► NotificationWorker
//!                                           ├─► JobHandler::handle（同時実行数はセマフォで制限）
//!                                           └─► 失敗時は固定間隔でリトライ
//! run_overdue_sweeper（interval） ──► overdue_sweep ──► ChannelTaskQueue::enqueue
//! ```

pub mod channel;
pub mod scheduler;
pub mod worker;

pub use channel::{ChannelTaskQueue, QueuedJob};
pub use scheduler::run_overdue_sweeper;
pub use worker::{NotificationWorker, RetryPolicy, WorkerConfig, execute};
