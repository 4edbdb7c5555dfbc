use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::filter::{filter_loans, FilterCriteria};
use crate::loan::Loan;
use crate::store::LoanStore;

/// Notice shown for a failed refresh. Generic and retryable; the next tick
/// fetches again.
const FETCH_NOTICE: &str = "Error fetching loans.";

/// Immutable view of the loan list as of the latest refresh. A failed
/// refresh keeps the previous list and sets the notice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListSnapshot {
    pub loans: Vec<Loan>,
    pub notice: Option<String>,
}

/// Periodic refresh of the loan list, published as snapshots over a watch
/// channel. The refresh task is owned by the feed: `stop()` or dropping the
/// feed aborts it, so the timer never outlives its owner.
pub struct ListFeed {
    rx: watch::Receiver<ListSnapshot>,
    task: JoinHandle<()>,
}

impl ListFeed {
    /// Spawn the refresh task. The first fetch happens immediately, then one
    /// fetch per `period`.
    pub fn start(store: Arc<dyn LoanStore>, period: Duration) -> Self {
        let (tx, rx) = watch::channel(ListSnapshot::default());
        let task = tokio::spawn(refresh_loop(store, period, tx));
        Self { rx, task }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> ListSnapshot {
        self.rx.borrow().clone()
    }

    /// A receiver for callers that want to await changes themselves.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.rx.clone()
    }

    pub fn stop(&self) {
        info!("stopping loan list refresh");
        self.task.abort();
    }
}

impl Drop for ListFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn refresh_loop(
    store: Arc<dyn LoanStore>,
    period: Duration,
    tx: watch::Sender<ListSnapshot>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        match store.list().await {
            Ok(loans) => {
                tx.send_replace(ListSnapshot { loans, notice: None });
            }
            Err(err) => {
                warn!("loan list refresh failed: {err}");
                let loans = tx.borrow().loans.clone();
                tx.send_replace(ListSnapshot {
                    loans,
                    notice: Some(FETCH_NOTICE.to_string()),
                });
            }
        }
    }
}

/// View model over a feed: the filtered view is derived from the latest
/// snapshot and the current criteria, recomputed on every read. Data flows
/// one direction only; nothing here mutates the snapshot.
pub struct LoanBoard {
    rx: watch::Receiver<ListSnapshot>,
    criteria: FilterCriteria,
}

impl LoanBoard {
    pub fn new(feed: &ListFeed) -> Self {
        Self {
            rx: feed.subscribe(),
            criteria: FilterCriteria::none(),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    /// The loans surviving the current criteria, in list order.
    pub fn visible(&self) -> Vec<Loan> {
        filter_loans(&self.rx.borrow().loans, &self.criteria)
    }

    /// Retryable notice from the latest refresh, if it failed.
    pub fn notice(&self) -> Option<String> {
        self.rx.borrow().notice.clone()
    }
}
