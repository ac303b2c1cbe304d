use crate::domain::EmailMessage;
use crate::ports::mailer::{Mailer as MailerTrait, Result};
use async_trait::async_trait;

/// ログ出力のみ行うMailer
///
/// 実際の送信は行わず、メッセージ内容をtracingで記録する。
/// 開発環境と、送信基盤を持たない構成で使用する。
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailerTrait for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if !message.to.contains('@') {
            return Err(format!("invalid recipient address: {}", message.to).into());
        }

        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email sent"
        );
        Ok(())
    }
}
