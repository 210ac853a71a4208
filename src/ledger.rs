//! Payment ledger: derived paid/remaining/completion state.
//!
//! An installment never stores how much of it has been paid. Every quantity
//! here is recomputed from the payment log on every read, so deleting a
//! payment out of band can never leave a stale running total behind. The
//! cost is one aggregate query per read; that trade is deliberate.

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal_macros::dec;

use crate::decimal::{Money, Percentage};
use crate::errors::{CoreError, Result};
use crate::events::{Event, EventStore};
use crate::models::{Installment, Payment};
use crate::store::RecordStore;
use crate::types::{InstallmentId, LedgerTotals, PaymentId};

fn require_installment<S: RecordStore>(store: &S, id: InstallmentId) -> Result<Installment> {
    store.installment(id)?.ok_or(CoreError::NotFound {
        entity: "installment",
        id,
    })
}

/// sum of all payment amounts recorded for the installment; zero if none
pub fn paid_amount<S: RecordStore>(store: &S, installment_id: InstallmentId) -> Result<Money> {
    Ok(store.sum_payments(installment_id)?)
}

/// total amount minus paid amount
///
/// Never negative while the add-payment guard holds, and deliberately not
/// clamped: a negative result means the store was mutated behind the
/// ledger's back and should be visible, not hidden.
pub fn remaining_amount<S: RecordStore>(
    store: &S,
    installment_id: InstallmentId,
) -> Result<Money> {
    let installment = require_installment(store, installment_id)?;
    let paid = store.sum_payments(installment_id)?;
    Ok(installment.total_amount - paid)
}

/// paid/total as a percentage, capped at 100
///
/// A zero total is degenerate and reported as fully complete rather than
/// dividing by zero.
pub fn completion_percentage<S: RecordStore>(
    store: &S,
    installment_id: InstallmentId,
) -> Result<Percentage> {
    let installment = require_installment(store, installment_id)?;
    let paid = store.sum_payments(installment_id)?;
    Ok(completion(paid, installment.total_amount))
}

/// whether nothing remains to pay
pub fn is_completed<S: RecordStore>(store: &S, installment_id: InstallmentId) -> Result<bool> {
    Ok(!remaining_amount(store, installment_id)?.is_positive())
}

/// all derived amounts for one installment in a single pass
pub fn totals<S: RecordStore>(store: &S, installment_id: InstallmentId) -> Result<LedgerTotals> {
    let installment = require_installment(store, installment_id)?;
    let paid = store.sum_payments(installment_id)?;
    let remaining = installment.total_amount - paid;

    Ok(LedgerTotals {
        total: installment.total_amount,
        paid,
        remaining,
        completion: completion(paid, installment.total_amount),
        completed: !remaining.is_positive(),
    })
}

fn completion(paid: Money, total: Money) -> Percentage {
    if total.is_zero() {
        return Percentage::FULL;
    }
    let pct = paid.as_decimal() / total.as_decimal() * dec!(100);
    Percentage::from_decimal(pct.min(dec!(100)))
}

/// payments recorded for the installment, newest payment date first
pub fn payments<S: RecordStore>(
    store: &S,
    installment_id: InstallmentId,
) -> Result<Vec<Payment>> {
    let mut rows = store.payments_for_installment(installment_id)?;
    rows.sort_by(|a, b| b.paid_on.cmp(&a.paid_on).then(b.created_at.cmp(&a.created_at)));
    Ok(rows)
}

/// record a payment against an installment
///
/// Rejected outright when the amount is not positive or when it would push
/// the paid sum past the installment's total; nothing is written in either
/// case. The payment date defaults to today when omitted.
pub fn add_payment<S: RecordStore>(
    store: &mut S,
    installment_id: InstallmentId,
    amount: Money,
    paid_on: Option<NaiveDate>,
    time: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<PaymentId> {
    let installment = require_installment(store, installment_id)?;

    if !amount.is_positive() {
        return Err(CoreError::InvalidPaymentAmount { amount });
    }

    let paid = store.sum_payments(installment_id)?;
    if paid + amount > installment.total_amount {
        return Err(CoreError::Overpayment {
            attempted: amount,
            paid,
            total: installment.total_amount,
        });
    }

    let now = time.now();
    let paid_on = paid_on.unwrap_or_else(|| now.date_naive());
    let payment = Payment::new(installment_id, amount, paid_on, now);
    let payment_id = payment.id;

    store.insert_payment(payment)?;

    let paid_to_date = paid + amount;
    events.emit(Event::PaymentRecorded {
        payment_id,
        installment_id,
        amount,
        paid_to_date,
        paid_on,
    });

    if paid_to_date >= installment.total_amount {
        events.emit(Event::InstallmentSettled {
            installment_id,
            total_amount: installment.total_amount,
            timestamp: now,
        });
    }

    Ok(payment_id)
}

/// remove a single payment; derived amounts reflect it on the next read
pub fn delete_payment<S: RecordStore>(
    store: &mut S,
    payment_id: PaymentId,
    time: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<()> {
    let payment = store.payment(payment_id)?.ok_or(CoreError::NotFound {
        entity: "payment",
        id: payment_id,
    })?;

    store.remove_payment(payment_id)?;

    events.emit(Event::PaymentDeleted {
        payment_id,
        installment_id: payment.installment_id,
        amount: payment.amount,
        timestamp: time.now(),
    });

    Ok(())
}

/// wipe every payment belonging to an installment
///
/// Used by the lifecycle manager ahead of installment deletion. Succeeds
/// with a count of zero when there is nothing to remove.
pub fn delete_all_for_installment<S: RecordStore>(
    store: &mut S,
    installment_id: InstallmentId,
) -> Result<u32> {
    Ok(store.remove_payments_for_installment(installment_id)?)
}
