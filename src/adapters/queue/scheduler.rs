use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::application::loan::{ServiceDependencies, overdue_sweep};

/// 延滞スイープを一定間隔で実行する
///
/// リクエストとは独立して動く。1回のスイープが失敗しても次の周期で再実行する。
/// 最初のスイープは起動直後に行われる。
pub async fn run_overdue_sweeper(deps: ServiceDependencies, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(period_secs = period.as_secs(), "Overdue sweeper started");

    loop {
        ticker.tick().await;

        if let Err(e) = overdue_sweep(&deps, Utc::now()).await {
            tracing::error!(error = ?e, "Overdue sweep failed");
        }
    }
}
