use crate::domain::EmailMessage;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// メッセージ送信ポート
///
/// 実装はメール、SMSなどが考えられる。送信できなかった場合は必ず`Err`を返す。
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}
