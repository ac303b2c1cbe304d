use crate::domain::{
    self, ExtendDueDateError, Loan, LoanId, LoanPolicy, NotificationJob, commands::*,
};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{LoanApplicationError, Result};

/// サービスの依存関係
///
/// リポジトリとタスクキューを明示的に受け取り、各関数に渡す。
/// グローバルなストレージ参照は持たない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub loans: Arc<dyn LoanRepository>,
    pub task_queue: Arc<dyn TaskQueue>,
    pub policy: LoanPolicy,
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 貸出可能冊数が1以上であること
/// - 会員が存在すること
///
/// 貸出の保存と冊数の減算はリポジトリが1つの単位として行う。
/// 通知ジョブの登録はその後に行い、登録に失敗しても貸出は取り消さない。
///
/// # 戻り値
/// 作成された貸出
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<Loan> {
    // 1. 書籍の存在と貸出可能冊数の確認
    let book = deps
        .books
        .get(cmd.book_id)
        .await
        .map_err(LoanApplicationError::BookRepositoryError)?
        .ok_or(LoanApplicationError::BookNotFound)?;

    if !book.is_available() {
        return Err(LoanApplicationError::NoAvailableCopies);
    }

    // 2. 会員の存在確認
    let member = deps
        .members
        .get(cmd.member_id)
        .await
        .map_err(LoanApplicationError::MemberRepositoryError)?;

    if member.is_none() {
        return Err(LoanApplicationError::MemberNotFound);
    }

    // 3. 貸出の作成と冊数の条件付き減算（ここで同時貸出の競合が解決される）
    let loan = domain::loan::open_loan(cmd.book_id, cmd.member_id, cmd.loaned_at, &deps.policy);

    let book = match deps
        .loans
        .open(&loan)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?
    {
        OpenLoanOutcome::Opened(book) => book,
        OpenLoanOutcome::NoAvailableCopies => return Err(LoanApplicationError::NoAvailableCopies),
        OpenLoanOutcome::BookNotFound => return Err(LoanApplicationError::BookNotFound),
        OpenLoanOutcome::MemberNotFound => return Err(LoanApplicationError::MemberNotFound),
    };

    tracing::info!(
        loan_id = %loan.loan_id.value(),
        book_id = %loan.book_id.value(),
        member_id = %loan.member_id.value(),
        available_copies = book.copies.available(),
        "Book loaned"
    );

    // 4. 通知ジョブの登録
    enqueue_or_log(
        deps,
        NotificationJob::LoanCreated {
            loan_id: loan.loan_id,
        },
    )
    .await;

    Ok(loan)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 書籍・会員の組に対する貸出中の貸出が存在すること
///
/// 返却済みフラグ・返却日の設定と冊数の加算はリポジトリが1つの単位として行う。
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<Loan> {
    // 1. 書籍の存在確認
    deps.books
        .get(cmd.book_id)
        .await
        .map_err(LoanApplicationError::BookRepositoryError)?
        .ok_or(LoanApplicationError::BookNotFound)?;

    // 2. 貸出中の貸出を返却済みにし、冊数を戻す
    let loan = deps
        .loans
        .close_active(cmd.book_id, cmd.member_id, cmd.returned_at.date_naive())
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?
        .ok_or(LoanApplicationError::ActiveLoanNotFound)?;

    tracing::info!(
        loan_id = %loan.loan_id.value(),
        book_id = %loan.book_id.value(),
        member_id = %loan.member_id.value(),
        "Book returned"
    );

    Ok(loan)
}

/// 返却期限を延長する
///
/// ビジネスルール：
/// - 貸出が存在し、返却済みでないこと
/// - 延滞していないこと（返却期限が要求時刻より後）
/// - 延長日数が0以上であること
pub async fn extend_due_date(deps: &ServiceDependencies, cmd: ExtendDueDate) -> Result<Loan> {
    // 1. 貸出を取得
    let loan = deps
        .loans
        .get(cmd.loan_id)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    // 2. ドメイン層の純粋関数を呼び出し
    let extended = domain::loan::extend_due_date(&loan, cmd.additional_days, cmd.requested_at)
        .map_err(|e| match e {
            ExtendDueDateError::Overdue => LoanApplicationError::LoanOverdue,
            ExtendDueDateError::AlreadyReturned => LoanApplicationError::LoanAlreadyReturned,
            ExtendDueDateError::InvalidExtension(reason) => {
                LoanApplicationError::InvalidExtension(reason.to_string())
            }
        })?;

    // 3. 貸出中の場合のみ更新される
    let updated = deps
        .loans
        .update_due_date(extended.loan_id, extended.due_date)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?;

    if !updated {
        return Err(LoanApplicationError::LoanNotFound);
    }

    tracing::info!(
        loan_id = %extended.loan_id.value(),
        additional_days = cmd.additional_days,
        new_due_date = %extended.due_date,
        "Loan due date extended"
    );

    Ok(extended)
}

pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loans
        .get(loan_id)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

pub async fn list_loans(deps: &ServiceDependencies) -> Result<Vec<Loan>> {
    deps.loans
        .list()
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)
}

/// 貸出を削除する
///
/// 貸出中だった場合、リポジトリが書籍の冊数を戻す。
pub async fn delete_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<()> {
    let deleted = deps
        .loans
        .delete(loan_id)
        .await
        .map_err(LoanApplicationError::LoanRepositoryError)?;

    if !deleted {
        return Err(LoanApplicationError::LoanNotFound);
    }

    tracing::info!(loan_id = %loan_id.value(), "Loan deleted");
    Ok(())
}

/// 通知ジョブを登録する。失敗はログに残し、呼び出し元には伝えない
async fn enqueue_or_log(deps: &ServiceDependencies, job: NotificationJob) {
    if let Err(e) = deps.task_queue.enqueue(job).await {
        tracing::warn!(
            job = job.kind(),
            loan_id = %job.loan_id().value(),
            error = %e,
            "Failed to enqueue notification job"
        );
    }
}
