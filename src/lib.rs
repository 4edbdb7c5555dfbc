pub mod board;
pub mod error;
pub mod filter;
pub mod loan;
pub mod store;

pub use board::{ListFeed, ListSnapshot, LoanBoard};
pub use error::{Error, Result};
pub use filter::{filter_loans, FilterCriteria};
pub use loan::{
    amortize, schedule, Amortization, Loan, LoanDraft, LoanId, LoanType, ScheduledPayment,
};
pub use store::{HttpLoanStore, LoanStore, MemoryStore};
