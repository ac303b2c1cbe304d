use std::time::Duration;

use thiserror::Error;

use crate::adapters::queue::{RetryPolicy, WorkerConfig};
use crate::domain::LoanPolicy;
use crate::domain::loan::{DEFAULT_LOAN_PERIOD_DAYS, MAX_LOAN_PERIOD_DAYS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// 環境変数から読み込むアプリケーション設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 未設定の場合はインメモリストレージで起動する
    pub database_url: Option<String>,
    pub port: u16,
    pub loan_period_days: i64,
    pub overdue_sweep_interval: Duration,
    pub mail_from: String,
    pub worker_concurrency: usize,
    pub job_max_attempts: u32,
    pub job_retry_backoff: Duration,
}

impl AppConfig {
    /// 環境変数から設定を読み込む（`.env`があれば先に読み込む）
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup`で値を引いて設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let loan_period_days = parse_or(&lookup, "LOAN_PERIOD_DAYS", DEFAULT_LOAN_PERIOD_DAYS)?;
        if !(1..=MAX_LOAN_PERIOD_DAYS).contains(&loan_period_days) {
            return Err(ConfigError::InvalidValue {
                key: "LOAN_PERIOD_DAYS",
                expected: "a number of days between 1 and 36500",
                value: loan_period_days.to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            port: parse_or(&lookup, "PORT", 3000)?,
            loan_period_days,
            overdue_sweep_interval: Duration::from_secs(
                parse_or(&lookup, "OVERDUE_SWEEP_INTERVAL_SECS", 3600u64)?.max(1),
            ),
            mail_from: lookup("MAIL_FROM").unwrap_or_else(|| "library@example.com".to_string()),
            worker_concurrency: parse_or(&lookup, "WORKER_CONCURRENCY", 4usize)?.max(1),
            job_max_attempts: parse_or(&lookup, "JOB_MAX_ATTEMPTS", 3u32)?.max(1),
            job_retry_backoff: Duration::from_millis(parse_or(
                &lookup,
                "JOB_RETRY_BACKOFF_MS",
                5000u64,
            )?),
        })
    }

    pub fn loan_policy(&self) -> LoanPolicy {
        LoanPolicy {
            loan_period_days: self.loan_period_days,
        }
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            concurrency: self.worker_concurrency,
            retry: RetryPolicy {
                max_attempts: self.job_max_attempts,
                backoff: self.job_retry_backoff,
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key,
            expected: "a non-negative integer",
            value,
        }),
    }
}
