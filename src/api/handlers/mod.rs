//! HTTPハンドラー
//!
//! 各ハンドラーはリクエストをコマンド・入力値に変換してアプリケーション層を呼び出し、
//! 結果をレスポンス型に変換するだけの薄い層。

pub mod catalog;
pub mod loans;
pub mod members;

use crate::application::loan::ServiceDependencies;

pub use catalog::*;
pub use loans::*;
pub use members::*;

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}
