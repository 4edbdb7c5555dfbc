use thiserror::Error;

use crate::loan::LoanId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("loan {0} not found")]
    NotFound(LoanId),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl Error {
    /// True for failures worth retrying on a later refresh (transport and
    /// server-side trouble), false for caller mistakes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::UnexpectedStatus { .. })
    }
}
