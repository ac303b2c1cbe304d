pub mod catalog;
pub mod commands;
pub mod errors;
pub mod loan;
pub mod member;
pub mod notification;
pub mod value_objects;

pub use catalog::*;
pub use errors::*;
pub use loan::{Loan, LoanPolicy, LoanStatus};
pub use member::*;
pub use notification::*;
pub use value_objects::*;
