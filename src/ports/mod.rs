pub mod author_repository;
pub mod book_repository;
pub mod loan_repository;
pub mod mailer;
pub mod member_repository;
pub mod task_queue;

pub use author_repository::AuthorRepository;
pub use book_repository::{BookChanges, BookRepository, UpdateBookOutcome};
pub use loan_repository::{LoanRepository, OpenLoanOutcome};
pub use mailer::Mailer;
pub use member_repository::MemberRepository;
pub use task_queue::{JobHandler, TaskQueue};
