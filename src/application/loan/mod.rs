mod errors;
mod loan_service;
mod overdue_sweep;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{
    ServiceDependencies, create_loan, delete_loan, extend_due_date, get_loan, list_loans,
    return_loan,
};
pub use overdue_sweep::{SweepFailure, SweepReport, overdue_sweep};
