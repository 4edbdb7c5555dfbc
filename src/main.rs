#![allow(dead_code)]
use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use loanbook::board::{ListFeed, LoanBoard};
use loanbook::filter::FilterCriteria;
use loanbook::loan::*;
use loanbook::store::{HttpLoanStore, LoanStore, MemoryStore};
use log::warn;
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    // with a base URL argument, talk to the remote store; otherwise run
    // against a locally seeded in-memory store
    let store: Arc<dyn LoanStore> = match env::args().nth(1) {
        Some(base) => Arc::new(HttpLoanStore::new(base)),
        None => {
            let store = MemoryStore::new();
            seed(&store).await;
            Arc::new(store)
        }
    };

    let feed = ListFeed::start(store, Duration::from_secs(1));
    let mut rx = feed.subscribe();
    if rx.changed().await.is_err() {
        eprintln!("loan feed closed before the first refresh");
        return;
    }

    let mut board = LoanBoard::new(&feed);
    if let Some(loan_type) = env::args().nth(2) {
        board.set_criteria(FilterCriteria::by_type(loan_type));
    }

    if let Some(notice) = board.notice() {
        eprintln!("{}", notice);
    }
    let visible = board.visible();
    if visible.is_empty() {
        println!("No loans available.");
    }
    for loan in &visible {
        println!("{}", loan);
        match amortize(loan.amount, loan.interest_rate, loan.term) {
            Ok(plan) => println!("  {}", plan),
            Err(err) => warn!("cannot amortize loan {}: {}", loan.id, err),
        }
    }
    if let Some(loan) = visible.first() {
        show_schedule(loan);
    }

    feed.stop();
}

async fn seed(store: &MemoryStore) {
    for draft in [
        LoanDraft::new(10000., 5., 12, LoanType::Personal),
        LoanDraft::new(28000., 6.4, 60, LoanType::Auto),
        LoanDraft::new(320000., 5.8, 360, LoanType::Mortgage),
    ] {
        if let Err(err) = store.create(&draft).await {
            warn!("seed loan rejected: {}", err);
        }
    }
}

fn show_schedule(loan: &Loan) {
    let first_pmt_date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    match schedule(loan.amount, loan.interest_rate, loan.term, first_pmt_date) {
        Ok(pmts) => {
            println!("schedule for loan {}:", loan.id);
            for pmt in pmts {
                println!("  {}", pmt);
            }
        }
        Err(err) => warn!("cannot schedule loan {}: {}", loan.id, err),
    }
}

// verifies that types can implement the gated traits below
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<Loan>();
    is_normal::<LoanDraft>();
}
