use crate::domain::{
    Author, AuthorId, Book, BookId, Loan, LoanId, Member, MemberId, MemberLoanCount,
};
use crate::ports::book_repository::{BookChanges, UpdateBookOutcome};
use crate::ports::loan_repository::OpenLoanOutcome;
use crate::ports::{
    AuthorRepository, BookRepository, LoanRepository, MemberRepository, author_repository,
    book_repository, loan_repository, member_repository,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    authors: HashMap<AuthorId, Author>,
    books: HashMap<BookId, Book>,
    members: HashMap<MemberId, Member>,
    loans: HashMap<LoanId, Loan>,
}

impl Tables {
    /// 貸出中の貸出1件分の冊数を書籍に戻す
    fn restore_copy(&mut self, book_id: BookId, at: DateTime<Utc>) {
        if let Some(book) = self.books.get_mut(&book_id) {
            match book.check_in(at) {
                Ok(updated) => *book = updated,
                Err(e) => tracing::warn!(
                    book_id = %book_id.value(),
                    error = %e,
                    "Could not restore copy for returned loan"
                ),
            }
        }
    }

    fn remove_loans_where(&mut self, predicate: impl Fn(&Loan) -> bool) {
        let now = Utc::now();
        let removed: Vec<Loan> = self
            .loans
            .values()
            .filter(|&loan| predicate(loan))
            .cloned()
            .collect();

        for loan in removed {
            self.loans.remove(&loan.loan_id);
            if loan.is_active() {
                self.restore_copy(loan.book_id, now);
            }
        }
    }
}

/// 全リポジトリのインメモリ実装
///
/// すべてのテーブルを1つのロックで保護するため、
/// 貸出作成・返却の冊数増減と貸出行の更新は常に一体で行われる。
/// `DATABASE_URL`未設定時の起動とテストで使用する。
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn get(&self, author_id: AuthorId) -> author_repository::Result<Option<Author>> {
        Ok(self.tables.lock().await.authors.get(&author_id).cloned())
    }

    async fn list(&self) -> author_repository::Result<Vec<Author>> {
        let tables = self.tables.lock().await;
        let mut authors: Vec<Author> = tables.authors.values().cloned().collect();
        authors.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.author_id).cmp(&(&b.last_name, &b.first_name, b.author_id))
        });
        Ok(authors)
    }

    async fn create(&self, author: &Author) -> author_repository::Result<()> {
        self.tables
            .lock()
            .await
            .authors
            .insert(author.author_id, author.clone());
        Ok(())
    }

    async fn update(&self, author: &Author) -> author_repository::Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.authors.get_mut(&author.author_id) {
            Some(existing) => {
                *existing = author.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, author_id: AuthorId) -> author_repository::Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.authors.remove(&author_id).is_none() {
            return Ok(false);
        }

        let book_ids: Vec<BookId> = tables
            .books
            .values()
            .filter(|book| book.author_id == author_id)
            .map(|book| book.book_id)
            .collect();
        for book_id in &book_ids {
            tables.books.remove(book_id);
        }
        tables.loans.retain(|_, loan| !book_ids.contains(&loan.book_id));
        Ok(true)
    }
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn get(&self, book_id: BookId) -> book_repository::Result<Option<Book>> {
        Ok(self.tables.lock().await.books.get(&book_id).cloned())
    }

    async fn list(&self) -> book_repository::Result<Vec<Book>> {
        let tables = self.tables.lock().await;
        let mut books: Vec<Book> = tables.books.values().cloned().collect();
        books.sort_by(|a, b| (&a.title, a.book_id).cmp(&(&b.title, b.book_id)));
        Ok(books)
    }

    async fn create(&self, book: &Book) -> book_repository::Result<()> {
        let mut tables = self.tables.lock().await;
        if !tables.authors.contains_key(&book.author_id) {
            return Err(format!("author {} does not exist", book.author_id.value()).into());
        }
        tables.books.insert(book.book_id, book.clone());
        Ok(())
    }

    async fn update(
        &self,
        book_id: BookId,
        changes: &BookChanges,
    ) -> book_repository::Result<UpdateBookOutcome> {
        let mut tables = self.tables.lock().await;
        if !tables.authors.contains_key(&changes.author_id) {
            return Err(format!("author {} does not exist", changes.author_id.value()).into());
        }
        let Some(existing) = tables.books.get_mut(&book_id) else {
            return Ok(UpdateBookOutcome::BookNotFound);
        };

        let on_loan = existing.copies.on_loan();
        let Ok(copies) = existing.copies.resize(changes.total_copies) else {
            return Ok(UpdateBookOutcome::TotalBelowOnLoan { on_loan });
        };
        if let Some(expected) = changes.expected_available {
            if expected != copies.available() {
                return Ok(UpdateBookOutcome::AvailableMismatch {
                    available: copies.available(),
                });
            }
        }

        *existing = Book {
            title: changes.title.clone(),
            author_id: changes.author_id,
            isbn: changes.isbn.clone(),
            genre: changes.genre.clone(),
            copies,
            updated_at: changes.updated_at,
            ..existing.clone()
        };
        Ok(UpdateBookOutcome::Updated(existing.clone()))
    }

    async fn delete(&self, book_id: BookId) -> book_repository::Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.books.remove(&book_id).is_none() {
            return Ok(false);
        }
        tables.loans.retain(|_, loan| loan.book_id != book_id);
        Ok(true)
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn get(&self, member_id: MemberId) -> member_repository::Result<Option<Member>> {
        Ok(self.tables.lock().await.members.get(&member_id).cloned())
    }

    async fn list(&self) -> member_repository::Result<Vec<Member>> {
        let tables = self.tables.lock().await;
        let mut members: Vec<Member> = tables.members.values().cloned().collect();
        members.sort_by(|a, b| (a.joined_at, a.member_id).cmp(&(b.joined_at, b.member_id)));
        Ok(members)
    }

    async fn create(&self, member: &Member) -> member_repository::Result<()> {
        self.tables
            .lock()
            .await
            .members
            .insert(member.member_id, member.clone());
        Ok(())
    }

    async fn update(&self, member: &Member) -> member_repository::Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.members.get_mut(&member.member_id) {
            Some(existing) => {
                *existing = member.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, member_id: MemberId) -> member_repository::Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.members.remove(&member_id).is_none() {
            return Ok(false);
        }
        tables.remove_loans_where(|loan| loan.member_id == member_id);
        Ok(true)
    }

    async fn top_by_loan_count(
        &self,
        limit: usize,
    ) -> member_repository::Result<Vec<MemberLoanCount>> {
        let tables = self.tables.lock().await;

        let mut counts: HashMap<MemberId, u64> = HashMap::new();
        for loan in tables.loans.values() {
            *counts.entry(loan.member_id).or_default() += 1;
        }

        let mut ranked: Vec<MemberLoanCount> = tables
            .members
            .values()
            .map(|member| MemberLoanCount {
                member: member.clone(),
                loan_count: counts.get(&member.member_id).copied().unwrap_or(0),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.loan_count
                .cmp(&a.loan_count)
                .then_with(|| a.member.member_id.cmp(&b.member.member_id))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[async_trait]
impl LoanRepository for InMemoryStore {
    async fn open(&self, loan: &Loan) -> loan_repository::Result<OpenLoanOutcome> {
        let mut tables = self.tables.lock().await;

        if !tables.members.contains_key(&loan.member_id) {
            return Ok(OpenLoanOutcome::MemberNotFound);
        }

        let Some(book) = tables.books.get_mut(&loan.book_id) else {
            return Ok(OpenLoanOutcome::BookNotFound);
        };

        let Ok(checked_out) = book.check_out(loan.loan_date) else {
            return Ok(OpenLoanOutcome::NoAvailableCopies);
        };

        *book = checked_out.clone();
        tables.loans.insert(loan.loan_id, loan.clone());
        Ok(OpenLoanOutcome::Opened(checked_out))
    }

    async fn close_active(
        &self,
        book_id: BookId,
        member_id: MemberId,
        returned_on: NaiveDate,
    ) -> loan_repository::Result<Option<Loan>> {
        let mut tables = self.tables.lock().await;

        let Some(loan_id) = tables
            .loans
            .values()
            .filter(|loan| loan.book_id == book_id && loan.member_id == member_id && loan.is_active())
            .min_by_key(|loan| (loan.loan_date, loan.loan_id))
            .map(|loan| loan.loan_id)
        else {
            return Ok(None);
        };

        let Some(loan) = tables.loans.get_mut(&loan_id) else {
            return Ok(None);
        };
        let returned = crate::domain::loan::return_loan(loan, returned_on)?;
        *loan = returned.clone();

        tables.restore_copy(book_id, Utc::now());
        Ok(Some(returned))
    }

    async fn get(&self, loan_id: LoanId) -> loan_repository::Result<Option<Loan>> {
        Ok(self.tables.lock().await.loans.get(&loan_id).cloned())
    }

    async fn list(&self) -> loan_repository::Result<Vec<Loan>> {
        let tables = self.tables.lock().await;
        let mut loans: Vec<Loan> = tables.loans.values().cloned().collect();
        loans.sort_by(|a, b| (a.loan_date, a.loan_id).cmp(&(b.loan_date, b.loan_id)));
        Ok(loans)
    }

    async fn update_due_date(
        &self,
        loan_id: LoanId,
        due_date: DateTime<Utc>,
    ) -> loan_repository::Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.loans.get_mut(&loan_id) {
            Some(loan) if loan.is_active() => {
                loan.due_date = due_date;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, loan_id: LoanId) -> loan_repository::Result<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.loans.contains_key(&loan_id) {
            return Ok(false);
        }
        tables.remove_loans_where(|loan| loan.loan_id == loan_id);
        Ok(true)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> loan_repository::Result<Vec<Loan>> {
        let tables = self.tables.lock().await;
        let mut overdue: Vec<Loan> = tables
            .loans
            .values()
            .filter(|loan| crate::domain::loan::is_overdue(loan, now))
            .cloned()
            .collect();
        overdue.sort_by(|a, b| (a.due_date, a.loan_id).cmp(&(b.due_date, b.loan_id)));
        Ok(overdue)
    }
}
