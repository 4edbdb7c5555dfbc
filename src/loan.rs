use chrono::NaiveDate;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Identifier assigned by the loan store.
pub type LoanId = u64;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LoanType {
    Personal,
    Auto,
    Mortgage,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Personal => "Personal",
            LoanType::Auto => "Auto",
            LoanType::Mortgage => "Mortgage",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = Error;

    // accepts any casing; the store always writes the capitalized form
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(LoanType::Personal),
            "auto" => Ok(LoanType::Auto),
            "mortgage" => Ok(LoanType::Mortgage),
            other => Err(Error::InvalidInput(format!("unknown loan type: {other}"))),
        }
    }
}

/// A loan record as held by the store. Records are created and deleted,
/// never mutated in place.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub amount: f64,
    pub interest_rate: f64,
    pub term: u32,
    pub loan_type: LoanType,
    pub monthly_payment: f64,
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loan {}, {} for ${:.2} at {}% over {} months, monthly payment ${:.2}",
            self.id, self.loan_type, self.amount, self.interest_rate, self.term, self.monthly_payment
        )
    }
}

/// A creation request, before the store has assigned an id.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LoanDraft {
    pub amount: f64,
    pub interest_rate: f64,
    pub term: u32,
    pub loan_type: LoanType,
}

impl LoanDraft {
    pub fn new(amount: f64, interest_rate: f64, term: u32, loan_type: LoanType) -> Self {
        Self {
            amount,
            interest_rate,
            term,
            loan_type,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_terms(self.amount, self.interest_rate, self.term)
    }
}

#[derive(PartialEq, Debug)]
pub struct Amortization {
    pub monthly_payment: f64,
    pub total_repayment: f64,
    pub interest_amount: f64,
}

impl fmt::Display for Amortization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "monthly payment ${:.2}, total repayment ${:.2}, interest ${:.2}",
            self.monthly_payment, self.total_repayment, self.interest_amount
        )
    }
}

#[derive(PartialEq, Debug)]
pub struct ScheduledPayment {
    pub number: u32,
    pub date: NaiveDate,
    pub amount: f64,
    pub interest_paid: f64,
    pub end_balance: f64,
}

impl fmt::Display for ScheduledPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pmt number {}, date {}, payment ${:.2}, interest paid ${:.2}, ending balance ${:.2}",
            self.number, self.date, self.amount, self.interest_paid, self.end_balance
        )
    }
}

/// Fixed-payment amortization summary for a loan.
///
/// Keeps full f64 precision through the computation and rounds the three
/// outputs to cents at the end. A zero rate degenerates to principal spread
/// evenly over the term; the general formula would divide by zero there.
pub fn amortize(principal: f64, annual_rate: f64, term: u32) -> Result<Amortization> {
    check_terms(principal, annual_rate, term)?;

    let monthly_payment = payment_amount(principal, monthly_rate(annual_rate), term)?;
    let total_repayment = monthly_payment * f64::from(term);
    let interest_amount = total_repayment - principal;

    Ok(Amortization {
        monthly_payment: round(monthly_payment, 2.),
        total_repayment: round(total_repayment, 2.),
        interest_amount: round(interest_amount, 2.),
    })
}

/// Scheduled payment breakdown for a loan, one entry per month starting at
/// `first_pmt_date`. The last payment is clamped to clear the balance exactly.
pub fn schedule(
    principal: f64,
    annual_rate: f64,
    term: u32,
    first_pmt_date: NaiveDate,
) -> Result<Vec<ScheduledPayment>> {
    check_terms(principal, annual_rate, term)?;

    let rate = monthly_rate(annual_rate);
    let pmt_amount = payment_amount(principal, rate, term)?;

    let mut sched_pmt = Vec::with_capacity(term as usize);
    let mut balance = principal;
    let mut pmt_date = first_pmt_date;

    for pmt_number in 1..=term {
        let interest = balance * rate;
        let mut pmt_amt = pmt_amount;

        if pmt_number == term || pmt_amt >= balance + interest {
            pmt_amt = balance + interest;
            balance = 0.;
        } else {
            balance -= pmt_amt - interest;
        }
        trace!(
            "pmt # {}, date {}, interest {}, end bal {}",
            pmt_number,
            pmt_date,
            interest,
            balance
        );

        sched_pmt.push(ScheduledPayment {
            number: pmt_number,
            date: pmt_date,
            amount: round(pmt_amt, 2.),
            interest_paid: round(interest, 2.),
            end_balance: round(balance, 2.),
        });
        pmt_date = next_pmt_date(&pmt_date);
    }
    Ok(sched_pmt)
}

fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 100. / 12.
}

fn payment_amount(principal: f64, rate: f64, term: u32) -> Result<f64> {
    let pmt_amount = if rate == 0. {
        principal / f64::from(term)
    } else {
        let factor = (1. + rate).powf(f64::from(term));
        principal * rate * factor / (factor - 1.)
    };
    // valid but extreme inputs can overflow the compounding factor
    if pmt_amount.is_finite() {
        Ok(pmt_amount)
    } else {
        Err(Error::InvalidInput(format!(
            "payment does not stay finite for {principal} over {term} months"
        )))
    }
}

fn check_terms(principal: f64, annual_rate: f64, term: u32) -> Result<()> {
    if !principal.is_finite() || principal <= 0. {
        return Err(Error::InvalidInput(format!(
            "principal must be a positive finite amount, got {principal}"
        )));
    }
    if !annual_rate.is_finite() || annual_rate < 0. {
        return Err(Error::InvalidInput(format!(
            "annual rate must be a non-negative finite percentage, got {annual_rate}"
        )));
    }
    if term == 0 {
        return Err(Error::InvalidInput("term must be at least one month".to_string()));
    }
    Ok(())
}

fn round(amt: f64, dec: f64) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powf(dec)).round() / 10_f64.powf(dec)
    }
}

// monthly payments fall on the same day of the next month, clamped to its end
fn next_pmt_date(&begin_date: &NaiveDate) -> NaiveDate {
    match begin_date.checked_add_months(chrono::Months::new(1)) {
        Some(end_date) => end_date,
        None => panic!("{} does not return a new payment date", begin_date),
    }
}
