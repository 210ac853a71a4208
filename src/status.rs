//! Point-in-time status derivation.
//!
//! Both functions are pure and total: no clock access, no storage, defined
//! for every input combination. "Today" is always passed in by the caller,
//! which keeps list and detail rendering free to evaluate any date.

use chrono::NaiveDate;

use crate::types::{DebtStatus, SubscriptionStatus};

/// derive a debt's status from its stored facts and the evaluation day
///
/// A settled debt stays `Paid` whatever the dates say. An open debt is
/// `Overdue` only when a due date exists and lies strictly before today; a
/// debt due today is still `Unpaid`.
pub fn debt_status(due_date: Option<NaiveDate>, is_paid: bool, today: NaiveDate) -> DebtStatus {
    if is_paid {
        return DebtStatus::Paid;
    }
    match due_date {
        Some(due) if due < today => DebtStatus::Overdue,
        _ => DebtStatus::Unpaid,
    }
}

/// derive a subscription's status from its date window and the evaluation day
///
/// Both window endpoints are inclusive: a subscription is `Active` on its
/// start day and on its end day.
pub fn subscription_status(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> SubscriptionStatus {
    let (start, end) = match (start_date, end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => return SubscriptionStatus::Undated,
    };

    if end < today {
        SubscriptionStatus::Expired
    } else if start > today {
        SubscriptionStatus::NotStarted
    } else {
        SubscriptionStatus::Active
    }
}
