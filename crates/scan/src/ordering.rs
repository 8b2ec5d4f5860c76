//! Deterministic report order.
//!
//! Keys, ascending:
//! 1. number of failed rules,
//! 2. failed-rule sets: the smallest rule name present in only one of the two sets
//!    puts its owner first,
//! 3. creation date,
//! 4. order number.
//!
//! The sort is stable, so fully equal entries keep their discovery order.

use std::cmp::Ordering;

use orderscan_rules::RuleFailures;

use crate::report::OrderResult;

pub fn compare_results(a: &OrderResult, b: &OrderResult) -> Ordering {
    a.failure_count()
        .cmp(&b.failure_count())
        .then_with(|| compare_failure_sets(&a.errors, &b.errors))
        .then_with(|| a.created_date.cmp(&b.created_date))
        .then_with(|| a.order_number.cmp(&b.order_number))
}

pub fn sort_report(results: &mut [OrderResult]) {
    results.sort_by(compare_results);
}

/// Walks both name sets in ascending order; the first name found in only one
/// set decides.
fn compare_failure_sets(a: &RuleFailures, b: &RuleFailures) -> Ordering {
    let mut left = a.keys().peekable();
    let mut right = b.keys().peekable();
    loop {
        match (left.peek(), right.peek()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (Some(l), Some(r)) => match l.cmp(r) {
                Ordering::Equal => {
                    left.next();
                    right.next();
                }
                Ordering::Less => return Ordering::Less,
                Ordering::Greater => return Ordering::Greater,
            },
        }
    }
}
