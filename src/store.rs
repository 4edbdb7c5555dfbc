use async_trait::async_trait;
use log::{info, warn};
use reqwest::StatusCode;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::loan::{amortize, Loan, LoanDraft, LoanId};

/// The remote collection of loan records. Implementations handle create,
/// list, fetch, and delete; callers never mutate a record in place.
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn create(&self, draft: &LoanDraft) -> Result<Loan>;
    async fn list(&self) -> Result<Vec<Loan>>;
    async fn fetch(&self, id: LoanId) -> Result<Loan>;

    /// Idempotent: deleting an id that is already gone is not an error.
    async fn delete(&self, id: LoanId) -> Result<()>;
}

/// REST-backed store speaking the snake_case wire contract:
/// `POST /loans/`, `GET /loans/`, `GET /loans/{id}`, `DELETE /loans/{id}`.
pub struct HttpLoanStore {
    http: reqwest::Client,
    base: String,
}

impl HttpLoanStore {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    fn loans_url(&self) -> String {
        format!("{}/loans/", self.base)
    }

    fn loan_url(&self, id: LoanId) -> String {
        format!("{}/loans/{}", self.base, id)
    }
}

#[async_trait]
impl LoanStore for HttpLoanStore {
    async fn create(&self, draft: &LoanDraft) -> Result<Loan> {
        draft.validate()?;
        let resp = self.http.post(self.loans_url()).json(draft).send().await?;
        let resp = check_status(resp)?;
        let loan: Loan = resp.json().await?;
        info!("created {}", loan);
        Ok(loan)
    }

    async fn list(&self) -> Result<Vec<Loan>> {
        let resp = self.http.get(self.loans_url()).send().await?;
        let resp = check_status(resp)?;
        Ok(resp.json().await?)
    }

    async fn fetch(&self, id: LoanId) -> Result<Loan> {
        let resp = self.http.get(self.loan_url(id)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(id));
        }
        let resp = check_status(resp)?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, id: LoanId) -> Result<()> {
        let resp = self.http.delete(self.loan_url(id)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            warn!("delete of loan {} ignored, already gone", id);
            return Ok(());
        }
        check_status(resp)?;
        Ok(())
    }
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(Error::UnexpectedStatus {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}

/// In-process store with the same contract as the remote one: sequential id
/// assignment and the monthly payment computed at creation time. Useful
/// offline and as a test double.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    loans: Vec<Loan>,
    next_id: LoanId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn create(&self, draft: &LoanDraft) -> Result<Loan> {
        // also validates the draft
        let plan = amortize(draft.amount, draft.interest_rate, draft.term)?;

        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let loan = Loan {
            id: inner.next_id,
            amount: draft.amount,
            interest_rate: draft.interest_rate,
            term: draft.term,
            loan_type: draft.loan_type,
            monthly_payment: plan.monthly_payment,
        };
        inner.loans.push(loan.clone());
        Ok(loan)
    }

    async fn list(&self) -> Result<Vec<Loan>> {
        Ok(self.inner.lock().await.loans.clone())
    }

    async fn fetch(&self, id: LoanId) -> Result<Loan> {
        self.inner
            .lock()
            .await
            .loans
            .iter()
            .find(|loan| loan.id == id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    async fn delete(&self, id: LoanId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let before = inner.loans.len();
        inner.loans.retain(|loan| loan.id != id);
        if inner.loans.len() == before {
            warn!("delete of loan {} ignored, already gone", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanType;

    #[tokio::test]
    async fn test_memory_store_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store
            .create(&LoanDraft::new(10000., 5., 12, LoanType::Personal))
            .await
            .unwrap();
        let b = store
            .create(&LoanDraft::new(2500., 4.25, 36, LoanType::Auto))
            .await
            .unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.monthly_payment, 856.07);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_rejects_invalid_draft() {
        let store = MemoryStore::new();
        assert!(store
            .create(&LoanDraft::new(10000., 5., 0, LoanType::Personal))
            .await
            .is_err());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_relist_excludes_id() {
        let store = MemoryStore::new();
        let a = store
            .create(&LoanDraft::new(10000., 5., 12, LoanType::Personal))
            .await
            .unwrap();
        let b = store
            .create(&LoanDraft::new(2500., 4.25, 36, LoanType::Auto))
            .await
            .unwrap();

        store.delete(a.id).await.unwrap();
        let remaining = store.list().await.unwrap();
        assert!(remaining.iter().all(|loan| loan.id != a.id));
        assert_eq!(remaining.iter().map(|l| l.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let a = store
            .create(&LoanDraft::new(10000., 5., 12, LoanType::Personal))
            .await
            .unwrap();

        store.delete(a.id).await.unwrap();
        // second delete of the same id is not an error
        store.delete(a.id).await.unwrap();
        store.delete(999).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let store = MemoryStore::new();
        match store.fetch(42).await {
            Err(Error::NotFound(42)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_created_record() {
        let store = MemoryStore::new();
        let created = store
            .create(&LoanDraft::new(10000., 5., 12, LoanType::Mortgage))
            .await
            .unwrap();
        let fetched = store.fetch(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_http_store_urls() {
        let store = HttpLoanStore::new("http://127.0.0.1:8000/");
        assert_eq!(store.loans_url(), "http://127.0.0.1:8000/loans/");
        assert_eq!(store.loan_url(7), "http://127.0.0.1:8000/loans/7");
    }
}
