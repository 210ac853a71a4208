use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;

use crate::decimal::{Money, Percentage};
use crate::errors::{CoreError, Result};
use crate::events::Event;
use crate::ledger;
use crate::lifecycle;
use crate::models::{Installment, InstallmentDraft, InstallmentSummary, Payment};
use crate::services::{matches_term, BackOffice};
use crate::store::RecordStore;
use crate::types::{CustomerId, InstallmentId, InstallmentStatistics, PaymentId};
use crate::validation;

impl<S: RecordStore> BackOffice<S> {
    /// open a new installment plan for a customer
    pub fn add_installment(
        &mut self,
        draft: InstallmentDraft,
        time: &SafeTimeProvider,
    ) -> Result<InstallmentId> {
        let draft = draft.normalized();
        self.require_customer(draft.customer_id)?;
        validation::validate_installment(&draft, &self.limits)?;

        let installment = Installment::new(draft, time.now());
        let installment_id = installment.id;
        let customer_id = installment.customer_id;
        let total_amount = installment.total_amount;
        self.store.insert_installment(installment)?;

        self.events.emit(Event::InstallmentAdded {
            installment_id,
            customer_id,
            total_amount,
            timestamp: time.now(),
        });

        Ok(installment_id)
    }

    /// edit an installment's total, description or start date
    ///
    /// The total change goes through the lifecycle manager so it can never
    /// drop below what the payment log already holds; the owner never
    /// changes.
    pub fn update_installment(
        &mut self,
        id: InstallmentId,
        draft: InstallmentDraft,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let existing = self.require_installment(id)?;

        let mut draft = draft.normalized();
        draft.customer_id = existing.customer_id;
        validation::validate_installment(&draft, &self.limits)?;

        lifecycle::update_installment_total(
            &mut self.store,
            id,
            draft.total_amount,
            time,
            &mut self.events,
        )?;

        let mut updated = self.require_installment(id)?;
        updated.apply(draft);
        self.store.update_installment(&updated)?;
        Ok(())
    }

    /// delete an installment plan along with its payment log
    pub fn delete_installment(
        &mut self,
        id: InstallmentId,
        time: &SafeTimeProvider,
    ) -> Result<u32> {
        lifecycle::delete_installment(&mut self.store, id, time, &mut self.events)
    }

    pub fn installment(&self, id: InstallmentId) -> Result<Installment> {
        self.require_installment(id)
    }

    /// installment with its derived paid/remaining/completion amounts
    pub fn installment_summary(&self, id: InstallmentId) -> Result<InstallmentSummary> {
        let installment = self.require_installment(id)?;
        let totals = ledger::totals(&self.store, id)?;
        Ok(InstallmentSummary {
            installment,
            totals,
        })
    }

    /// all installment plans, newest first
    pub fn installments(&self) -> Result<Vec<Installment>> {
        let mut rows = self.store.installments()?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// one customer's installment plans, newest first
    pub fn installments_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Installment>> {
        let mut rows = self.store.installments_for_customer(customer_id)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// plans with something still to pay
    pub fn active_installments(&self) -> Result<Vec<Installment>> {
        self.installments_filtered(false)
    }

    /// plans fully covered by their payment log
    pub fn completed_installments(&self) -> Result<Vec<Installment>> {
        self.installments_filtered(true)
    }

    /// substring search over description, owner name and total amount
    pub fn search_installments(&self, term: &str) -> Result<Vec<Installment>> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.installments();
        }

        let names = self.customer_names()?;
        Ok(self
            .installments()?
            .into_iter()
            .filter(|i| {
                matches_term(&i.description, &term)
                    || i.total_amount.to_string().contains(&term)
                    || names
                        .get(&i.customer_id)
                        .is_some_and(|n| n.contains(&term))
            })
            .collect())
    }

    pub fn installment_statistics(&self) -> Result<InstallmentStatistics> {
        let installments = self.store.installments()?;

        let mut stats = InstallmentStatistics {
            total_count: installments.len() as u32,
            active_count: 0,
            completed_count: 0,
            total_amount: Money::ZERO,
            total_paid_amount: Money::ZERO,
            total_remaining_amount: Money::ZERO,
            average_completion: Percentage::ZERO,
        };

        let mut completion_sum = rust_decimal::Decimal::ZERO;
        for installment in &installments {
            let totals = ledger::totals(&self.store, installment.id)?;
            stats.total_amount += totals.total;
            stats.total_paid_amount += totals.paid;
            completion_sum += totals.completion.as_decimal();
            if totals.completed {
                stats.completed_count += 1;
            } else {
                stats.active_count += 1;
                stats.total_remaining_amount += totals.remaining;
            }
        }

        if !installments.is_empty() {
            stats.average_completion = Percentage::from_decimal(
                completion_sum / rust_decimal::Decimal::from(installments.len() as u64),
            );
        }

        Ok(stats)
    }

    /// record a payment toward an installment; date defaults to today
    pub fn add_payment(
        &mut self,
        installment_id: InstallmentId,
        amount: Money,
        paid_on: Option<NaiveDate>,
        time: &SafeTimeProvider,
    ) -> Result<PaymentId> {
        ledger::add_payment(
            &mut self.store,
            installment_id,
            amount,
            paid_on,
            time,
            &mut self.events,
        )
    }

    /// remove a payment; the corrected amounts show on the next read
    pub fn delete_payment(&mut self, payment_id: PaymentId, time: &SafeTimeProvider) -> Result<()> {
        ledger::delete_payment(&mut self.store, payment_id, time, &mut self.events)
    }

    /// payments recorded for one installment, newest payment date first
    pub fn payments(&self, installment_id: InstallmentId) -> Result<Vec<Payment>> {
        self.require_installment(installment_id)?;
        ledger::payments(&self.store, installment_id)
    }

    fn installments_filtered(&self, completed: bool) -> Result<Vec<Installment>> {
        let mut rows = Vec::new();
        for installment in self.installments()? {
            if ledger::is_completed(&self.store, installment.id)? == completed {
                rows.push(installment);
            }
        }
        Ok(rows)
    }

    fn require_installment(&self, id: InstallmentId) -> Result<Installment> {
        self.store.installment(id)?.ok_or(CoreError::NotFound {
            entity: "installment",
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerDraft;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal::Decimal;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn office_with_customer(time: &SafeTimeProvider) -> (BackOffice<MemoryStore>, CustomerId) {
        let mut office = BackOffice::new(MemoryStore::new());
        let id = office
            .add_customer(
                CustomerDraft {
                    name: "Karim".to_string(),
                    ..Default::default()
                },
                time,
            )
            .unwrap();
        (office, id)
    }

    fn plan(customer_id: CustomerId, total: i64, description: &str) -> InstallmentDraft {
        InstallmentDraft {
            customer_id,
            total_amount: Money::from_major(total),
            description: description.to_string(),
            start_date: None,
        }
    }

    #[test]
    fn test_summary_carries_derived_amounts() {
        let time = test_time();
        let (mut office, customer_id) = office_with_customer(&time);
        let id = office
            .add_installment(plan(customer_id, 1_000, "Freezer"), &time)
            .unwrap();

        office.add_payment(id, Money::from_major(400), None, &time).unwrap();

        let summary = office.installment_summary(id).unwrap();
        assert_eq!(summary.totals.paid, Money::from_major(400));
        assert_eq!(summary.totals.remaining, Money::from_major(600));
        assert_eq!(
            summary.totals.completion,
            Percentage::from_decimal(Decimal::from(40))
        );
        assert!(!summary.totals.completed);
    }

    #[test]
    fn test_active_and_completed_split() {
        let time = test_time();
        let (mut office, customer_id) = office_with_customer(&time);

        let open = office
            .add_installment(plan(customer_id, 1_000, "Freezer"), &time)
            .unwrap();
        let done = office
            .add_installment(plan(customer_id, 200, "Kettle"), &time)
            .unwrap();
        office.add_payment(done, Money::from_major(200), None, &time).unwrap();

        let active: Vec<_> = office
            .active_installments()
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        let completed: Vec<_> = office
            .completed_installments()
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(active, vec![open]);
        assert_eq!(completed, vec![done]);
    }

    #[test]
    fn test_update_keeps_collected_floor() {
        let time = test_time();
        let (mut office, customer_id) = office_with_customer(&time);
        let id = office
            .add_installment(plan(customer_id, 1_000, "Freezer"), &time)
            .unwrap();
        office.add_payment(id, Money::from_major(600), None, &time).unwrap();

        let err = office
            .update_installment(id, plan(customer_id, 500, "Freezer, renegotiated"), &time)
            .unwrap_err();
        assert!(matches!(err, CoreError::TotalBelowCollected { .. }));
        // nothing about the row changed
        let unchanged = office.installment(id).unwrap();
        assert_eq!(unchanged.total_amount, Money::from_major(1_000));
        assert_eq!(unchanged.description, "Freezer");

        office
            .update_installment(id, plan(customer_id, 800, "Freezer, renegotiated"), &time)
            .unwrap();
        let updated = office.installment(id).unwrap();
        assert_eq!(updated.total_amount, Money::from_major(800));
        assert_eq!(updated.description, "Freezer, renegotiated");
    }

    #[test]
    fn test_statistics_over_mixed_plans() {
        let time = test_time();
        let (mut office, customer_id) = office_with_customer(&time);

        let a = office
            .add_installment(plan(customer_id, 1_000, "Freezer"), &time)
            .unwrap();
        office.add_payment(a, Money::from_major(500), None, &time).unwrap();

        let b = office
            .add_installment(plan(customer_id, 200, "Kettle"), &time)
            .unwrap();
        office.add_payment(b, Money::from_major(200), None, &time).unwrap();

        let stats = office.installment_statistics().unwrap();
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.completed_count, 1);
        assert_eq!(stats.total_amount, Money::from_major(1_200));
        assert_eq!(stats.total_paid_amount, Money::from_major(700));
        // remaining counts only open plans
        assert_eq!(stats.total_remaining_amount, Money::from_major(500));
        // (50 + 100) / 2
        assert_eq!(
            stats.average_completion,
            Percentage::from_decimal(Decimal::from(75))
        );
    }

    #[test]
    fn test_payments_require_existing_installment() {
        let time = test_time();
        let (office, _customer_id) = office_with_customer(&time);

        let err = office.payments(uuid::Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound { entity: "installment", .. }
        ));
    }
}
