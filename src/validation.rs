//! Input validation, one validator per entity kind.
//!
//! Every check runs against normalized drafts before anything reaches the
//! store; a rejected draft leaves no state behind. Checks that need data
//! (phone uniqueness, overpayment) live where the data lives and surface
//! through the same error type.

use chrono::NaiveDate;

use crate::config::ValidationLimits;
use crate::errors::{CoreError, Result};
use crate::models::{CustomerDraft, DebtDraft, InstallmentDraft, SubscriptionDraft};

/// loose phone-shape check: digits plus common separators
pub fn is_valid_phone(phone: &str, limits: &ValidationLimits) -> bool {
    let len = phone.chars().count();
    if len < limits.phone_min_len || len > limits.phone_max_len {
        return false;
    }
    phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')'))
}

fn check_required(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CoreError::MissingField { field });
    }
    Ok(())
}

fn check_max_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(CoreError::FieldTooLong { field, max });
    }
    Ok(())
}

fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(CoreError::InvertedDateRange { start, end });
        }
    }
    Ok(())
}

/// validate a customer draft (expects normalized input)
pub fn validate_customer(draft: &CustomerDraft, limits: &ValidationLimits) -> Result<()> {
    check_required("name", &draft.name)?;
    if draft.name.chars().count() < limits.name_min_len {
        return Err(CoreError::FieldTooShort {
            field: "name",
            min: limits.name_min_len,
        });
    }
    check_max_len("name", &draft.name, limits.name_max_len)?;

    if let Some(phone) = &draft.phone {
        if !is_valid_phone(phone, limits) {
            return Err(CoreError::InvalidPhone {
                phone: phone.clone(),
            });
        }
    }

    if let Some(address) = &draft.address {
        check_max_len("address", address, limits.address_max_len)?;
    }
    if let Some(notes) = &draft.notes {
        check_max_len("notes", notes, limits.notes_max_len)?;
    }

    Ok(())
}

/// validate a debt draft (expects normalized input)
///
/// The past-due-date check applies only here, at creation/edit time; records
/// already in storage may legitimately carry a past due date and derive
/// `Overdue` from it.
pub fn validate_debt(draft: &DebtDraft, limits: &ValidationLimits, today: NaiveDate) -> Result<()> {
    if !draft.amount.is_positive() {
        return Err(CoreError::NonPositiveAmount {
            amount: draft.amount,
        });
    }
    if draft.amount > limits.max_amount {
        return Err(CoreError::AmountTooLarge {
            amount: draft.amount,
            max: limits.max_amount,
        });
    }

    check_required("description", &draft.description)?;
    check_max_len("description", &draft.description, limits.description_max_len)?;

    if let Some(due) = draft.due_date {
        if due < today {
            return Err(CoreError::DueDateInPast { due });
        }
    }

    Ok(())
}

/// validate an installment draft (expects normalized input)
pub fn validate_installment(draft: &InstallmentDraft, limits: &ValidationLimits) -> Result<()> {
    if !draft.total_amount.is_positive() {
        return Err(CoreError::NonPositiveAmount {
            amount: draft.total_amount,
        });
    }
    if draft.total_amount > limits.max_amount {
        return Err(CoreError::AmountTooLarge {
            amount: draft.total_amount,
            max: limits.max_amount,
        });
    }

    check_required("description", &draft.description)?;
    check_max_len("description", &draft.description, limits.description_max_len)?;

    Ok(())
}

/// validate a subscription draft (expects normalized input)
pub fn validate_subscription(draft: &SubscriptionDraft, limits: &ValidationLimits) -> Result<()> {
    check_required("plan name", &draft.plan_name)?;
    check_max_len("plan name", &draft.plan_name, limits.plan_name_max_len)?;

    if draft.monthly_fee.is_negative() {
        return Err(CoreError::NegativeFee {
            fee: draft.monthly_fee,
        });
    }
    if draft.monthly_fee > limits.max_monthly_fee {
        return Err(CoreError::AmountTooLarge {
            amount: draft.monthly_fee,
            max: limits.max_monthly_fee,
        });
    }

    check_date_order(draft.start_date, draft.end_date)?;

    Ok(())
}
