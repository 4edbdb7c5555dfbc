use crate::loan::Loan;

/// Optional narrowing of the loan list. An absent criterion means no
/// constraint; both present means both must match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    pub loan_type: Option<String>,
    pub interest_rate: Option<f64>,
}

impl FilterCriteria {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by_type(loan_type: impl Into<String>) -> Self {
        Self {
            loan_type: Some(loan_type.into()),
            interest_rate: None,
        }
    }

    pub fn by_rate(interest_rate: f64) -> Self {
        Self {
            loan_type: None,
            interest_rate: Some(interest_rate),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.loan_type.is_none() && self.interest_rate.is_none()
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        if let Some(wanted) = &self.loan_type {
            if !loan.loan_type.as_str().eq_ignore_ascii_case(wanted) {
                return false;
            }
        }
        if let Some(rate) = self.interest_rate {
            // exact equality on purpose: the criterion is a text-entered rate
            // parsed to f64, and rates that don't round-trip exactly will not
            // match stored values
            if loan.interest_rate != rate {
                return false;
            }
        }
        true
    }
}

/// Stable, order-preserving filter of `loans` by `criteria`. Pure: the same
/// inputs always yield the same output.
pub fn filter_loans(loans: &[Loan], criteria: &FilterCriteria) -> Vec<Loan> {
    loans.iter().filter(|loan| criteria.matches(loan)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanType;
    use test_log::test;

    fn sample() -> Vec<Loan> {
        vec![
            loan(1, LoanType::Personal, 5.),
            loan(2, LoanType::Auto, 3.5),
            loan(3, LoanType::Mortgage, 5.),
            loan(4, LoanType::Personal, 7.),
        ]
    }

    fn loan(id: u64, loan_type: LoanType, interest_rate: f64) -> Loan {
        Loan {
            id,
            amount: 10000.,
            interest_rate,
            term: 12,
            loan_type,
            monthly_payment: 856.07,
        }
    }

    #[test]
    fn test_no_criteria_is_identity() {
        let loans = sample();
        assert_eq!(filter_loans(&loans, &FilterCriteria::none()), loans);
    }

    #[test]
    fn test_type_match_is_case_insensitive() {
        let loans = sample();
        let filtered = filter_loans(&loans, &FilterCriteria::by_type("personal"));
        assert_eq!(filtered.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 4]);

        let filtered = filter_loans(&loans, &FilterCriteria::by_type("MORTGAGE"));
        assert_eq!(filtered.iter().map(|l| l.id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_unknown_type_matches_nothing() {
        let loans = sample();
        assert!(filter_loans(&loans, &FilterCriteria::by_type("payday")).is_empty());
    }

    #[test]
    fn test_rate_match_is_exact() {
        let loans = sample();
        let filtered = filter_loans(&loans, &FilterCriteria::by_rate(5.));
        assert_eq!(filtered.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 3]);

        // nearby rates do not match
        assert!(filter_loans(&loans, &FilterCriteria::by_rate(5.0001)).is_empty());
    }

    #[test]
    fn test_combined_criteria() {
        let loans = sample();
        let criteria = FilterCriteria {
            loan_type: Some("personal".to_string()),
            interest_rate: Some(5.),
        };
        let filtered = filter_loans(&loans, &criteria);
        assert_eq!(filtered.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_filter_is_idempotent_and_stable() {
        let loans = sample();
        let criteria = FilterCriteria::by_type("Personal");
        let once = filter_loans(&loans, &criteria);
        let twice = filter_loans(&once, &criteria);
        assert_eq!(once, twice);

        // surviving records keep their relative order
        let ids: Vec<_> = once.iter().map(|l| l.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
