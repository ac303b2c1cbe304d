pub mod catalog;
pub mod loan;
pub mod membership;
pub mod notification;
pub mod reports;

/// リクエスト処理で発生するエラーの分類
///
/// API層はこの分類からHTTPステータスを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 対象が存在しない（会員、書籍、貸出中の貸出など）
    NotFound,
    /// 事前条件を満たさない（貸出可能冊数なし、延滞中、不正な延長日数など）
    PreconditionFailed,
    /// ストレージ・キューなど外部要素の障害
    Infrastructure,
}
