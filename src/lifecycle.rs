//! Record lifecycle manager: mutations that span more than one entity kind.
//!
//! The store alone cannot promise that an installment never outlives its
//! payments or that a deleted customer leaves no dependents behind, so every
//! multi-entity delete is routed through here and ordered so the dependent
//! rows go first. If a dependent step fails, the owning row stays put.

use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{CoreError, Result};
use crate::events::{Event, EventStore};
use crate::ledger;
use crate::store::RecordStore;
use crate::types::{CascadeSummary, CustomerId, InstallmentId};

/// delete an installment and, first, every payment recorded against it
///
/// Fail-closed: when the payment wipe fails the installment row is left
/// untouched, so no payment can ever reference a missing installment.
pub fn delete_installment<S: RecordStore>(
    store: &mut S,
    installment_id: InstallmentId,
    time: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<u32> {
    if store.installment(installment_id)?.is_none() {
        return Err(CoreError::NotFound {
            entity: "installment",
            id: installment_id,
        });
    }

    let payments_removed = ledger::delete_all_for_installment(store, installment_id)?;
    store.remove_installment(installment_id)?;

    tracing::debug!(
        %installment_id,
        payments_removed,
        "installment deleted with its payment log"
    );

    events.emit(Event::InstallmentDeleted {
        installment_id,
        payments_removed,
        timestamp: time.now(),
    });

    Ok(payments_removed)
}

/// delete a customer and everything the customer owns
///
/// Debts and subscriptions are plain rows and are removed directly;
/// installments are routed through [`delete_installment`] so their payments
/// are cleaned up first. The customer row goes last.
pub fn delete_customer<S: RecordStore>(
    store: &mut S,
    customer_id: CustomerId,
    time: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<CascadeSummary> {
    if store.customer(customer_id)?.is_none() {
        return Err(CoreError::NotFound {
            entity: "customer",
            id: customer_id,
        });
    }

    let mut cascade = CascadeSummary::default();

    for installment in store.installments_for_customer(customer_id)? {
        cascade.payments_removed += delete_installment(store, installment.id, time, events)?;
        cascade.installments_removed += 1;
    }

    for debt in store.debts_for_customer(customer_id)? {
        store.remove_debt(debt.id)?;
        cascade.debts_removed += 1;
    }

    for subscription in store.subscriptions_for_customer(customer_id)? {
        store.remove_subscription(subscription.id)?;
        cascade.subscriptions_removed += 1;
    }

    store.remove_customer(customer_id)?;

    tracing::info!(
        %customer_id,
        debts = cascade.debts_removed,
        installments = cascade.installments_removed,
        payments = cascade.payments_removed,
        subscriptions = cascade.subscriptions_removed,
        "customer deleted with all owned records"
    );

    events.emit(Event::CustomerDeleted {
        customer_id,
        cascade,
        timestamp: time.now(),
    });

    Ok(cascade)
}

/// change an installment's total amount
///
/// The total can never drop below what the payment log already holds;
/// collected money does not evaporate.
pub fn update_installment_total<S: RecordStore>(
    store: &mut S,
    installment_id: InstallmentId,
    new_total: Money,
    time: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<()> {
    let mut installment = store.installment(installment_id)?.ok_or(CoreError::NotFound {
        entity: "installment",
        id: installment_id,
    })?;

    if !new_total.is_positive() {
        return Err(CoreError::NonPositiveAmount { amount: new_total });
    }

    let collected = ledger::paid_amount(store, installment_id)?;
    if new_total < collected {
        return Err(CoreError::TotalBelowCollected {
            requested: new_total,
            collected,
        });
    }

    let old_total = installment.total_amount;
    installment.total_amount = new_total;
    store.update_installment(&installment)?;

    if old_total != new_total {
        events.emit(Event::InstallmentTotalChanged {
            installment_id,
            old_total,
            new_total,
            timestamp: time.now(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Customer, CustomerDraft, Debt, DebtDraft, Installment, InstallmentDraft, Subscription,
        SubscriptionDraft,
    };
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        store: MemoryStore,
        customer_id: CustomerId,
        installment_id: InstallmentId,
        debt_id: crate::types::DebtId,
        subscription_id: crate::types::SubscriptionId,
        payment_ids: Vec<crate::types::PaymentId>,
    }

    /// customer with one installment (two payments), one overdue debt, one subscription
    fn fixture() -> Fixture {
        let mut store = MemoryStore::new();
        let time = test_time();
        let mut events = EventStore::new();
        let now = Utc::now();

        let customer = Customer::new(
            CustomerDraft {
                name: "Karim".to_string(),
                ..Default::default()
            },
            now,
        );
        let customer_id = customer.id;
        store.insert_customer(customer).unwrap();

        let installment = Installment::new(
            InstallmentDraft {
                customer_id,
                total_amount: Money::from_major(1_000),
                description: "Generator".to_string(),
                start_date: Some(day(2024, 1, 1)),
            },
            now,
        );
        let installment_id = installment.id;
        store.insert_installment(installment).unwrap();

        let payment_ids = vec![
            ledger::add_payment(
                &mut store,
                installment_id,
                Money::from_major(300),
                None,
                &time,
                &mut events,
            )
            .unwrap(),
            ledger::add_payment(
                &mut store,
                installment_id,
                Money::from_major(200),
                None,
                &time,
                &mut events,
            )
            .unwrap(),
        ];

        let debt = Debt::new(
            DebtDraft {
                customer_id,
                amount: Money::from_major(75),
                description: "Groceries".to_string(),
                due_date: Some(day(2024, 2, 1)),
            },
            now,
        );
        let debt_id = debt.id;
        store.insert_debt(debt).unwrap();

        let subscription = Subscription::new(
            SubscriptionDraft {
                customer_id,
                plan_name: "Fiber 50".to_string(),
                monthly_fee: Money::from_major(25),
                start_date: Some(day(2024, 1, 1)),
                end_date: Some(day(2024, 12, 31)),
            },
            now,
        );
        let subscription_id = subscription.id;
        store.insert_subscription(subscription).unwrap();

        Fixture {
            store,
            customer_id,
            installment_id,
            debt_id,
            subscription_id,
            payment_ids,
        }
    }

    #[test]
    fn test_delete_installment_removes_payment_log() {
        let mut f = fixture();
        let time = test_time();
        let mut events = EventStore::new();

        let removed =
            delete_installment(&mut f.store, f.installment_id, &time, &mut events).unwrap();
        assert_eq!(removed, 2);

        assert!(f.store.installment(f.installment_id).unwrap().is_none());
        for pid in &f.payment_ids {
            assert!(f.store.payment(*pid).unwrap().is_none());
        }
        assert!(f
            .store
            .payments_for_installment(f.installment_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_delete_customer_cascades_everything() {
        let mut f = fixture();
        let time = test_time();
        let mut events = EventStore::new();

        let cascade = delete_customer(&mut f.store, f.customer_id, &time, &mut events).unwrap();
        assert_eq!(cascade.debts_removed, 1);
        assert_eq!(cascade.installments_removed, 1);
        assert_eq!(cascade.payments_removed, 2);
        assert_eq!(cascade.subscriptions_removed, 1);

        assert!(f.store.customer(f.customer_id).unwrap().is_none());
        assert!(f.store.debt(f.debt_id).unwrap().is_none());
        assert!(f.store.installment(f.installment_id).unwrap().is_none());
        assert!(f.store.subscription(f.subscription_id).unwrap().is_none());
        for pid in &f.payment_ids {
            assert!(f.store.payment(*pid).unwrap().is_none());
        }
    }

    #[test]
    fn test_failed_payment_wipe_keeps_installment() {
        let mut f = fixture();
        let time = test_time();
        let mut events = EventStore::new();
        f.store.fail_payment_wipe = true;

        let err =
            delete_installment(&mut f.store, f.installment_id, &time, &mut events).unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
        assert!(!err.is_recoverable());

        // neither the installment nor its payments were touched
        assert!(f.store.installment(f.installment_id).unwrap().is_some());
        assert_eq!(
            f.store.payments_for_installment(f.installment_id).unwrap().len(),
            2
        );
        assert!(events.events().is_empty());
    }

    #[test]
    fn test_failed_payment_wipe_aborts_customer_cascade() {
        let mut f = fixture();
        let time = test_time();
        let mut events = EventStore::new();
        f.store.fail_payment_wipe = true;

        assert!(delete_customer(&mut f.store, f.customer_id, &time, &mut events).is_err());
        assert!(f.store.customer(f.customer_id).unwrap().is_some());
        assert!(f.store.installment(f.installment_id).unwrap().is_some());
    }

    #[test]
    fn test_total_cannot_drop_below_collected() {
        let mut f = fixture();
        let time = test_time();
        let mut events = EventStore::new();

        // 500 already collected
        let err = update_installment_total(
            &mut f.store,
            f.installment_id,
            Money::from_major(400),
            &time,
            &mut events,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::TotalBelowCollected { .. }));

        // original total unchanged
        let installment = f.store.installment(f.installment_id).unwrap().unwrap();
        assert_eq!(installment.total_amount, Money::from_major(1_000));
    }

    #[test]
    fn test_total_can_drop_to_collected_floor() {
        let mut f = fixture();
        let time = test_time();
        let mut events = EventStore::new();

        update_installment_total(
            &mut f.store,
            f.installment_id,
            Money::from_major(500),
            &time,
            &mut events,
        )
        .unwrap();

        // now exactly covered by the payment log
        assert!(ledger::is_completed(&f.store, f.installment_id).unwrap());
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::InstallmentTotalChanged { .. })));
    }

    #[test]
    fn test_delete_unknown_customer() {
        let mut store = MemoryStore::new();
        let time = test_time();
        let mut events = EventStore::new();

        let err = delete_customer(&mut store, uuid::Uuid::new_v4(), &time, &mut events)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "customer", .. }));
    }
}
