use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{CoreError, Result};
use crate::events::Event;
use crate::ledger;
use crate::models::{Customer, CustomerDraft};
use crate::services::{matches_term, BackOffice};
use crate::store::RecordStore;
use crate::types::{CascadeSummary, CustomerId, CustomerStatistics, SubscriptionStatus};
use crate::validation;
use crate::{lifecycle, status};

impl<S: RecordStore> BackOffice<S> {
    /// register a new customer
    pub fn add_customer(
        &mut self,
        draft: CustomerDraft,
        time: &SafeTimeProvider,
    ) -> Result<CustomerId> {
        let draft = draft.normalized();
        validation::validate_customer(&draft, &self.limits)?;

        if let Some(phone) = &draft.phone {
            if self.phone_in_use(phone, None)? {
                return Err(CoreError::DuplicatePhone {
                    phone: phone.clone(),
                });
            }
        }

        let customer = Customer::new(draft, time.now());
        let customer_id = customer.id;
        self.store.insert_customer(customer)?;

        tracing::debug!(%customer_id, "customer added");
        self.events.emit(Event::CustomerAdded {
            customer_id,
            timestamp: time.now(),
        });

        Ok(customer_id)
    }

    /// edit a customer's contact attributes
    pub fn update_customer(&mut self, id: CustomerId, draft: CustomerDraft) -> Result<()> {
        let mut existing = self.require_customer(id)?;

        let draft = draft.normalized();
        validation::validate_customer(&draft, &self.limits)?;

        if let Some(phone) = &draft.phone {
            // the record being updated may keep its own number
            if self.phone_in_use(phone, Some(id))? {
                return Err(CoreError::DuplicatePhone {
                    phone: phone.clone(),
                });
            }
        }

        existing.apply(draft);
        self.store.update_customer(&existing)?;
        Ok(())
    }

    /// delete a customer and cascade over everything the customer owns
    pub fn delete_customer(
        &mut self,
        id: CustomerId,
        time: &SafeTimeProvider,
    ) -> Result<CascadeSummary> {
        lifecycle::delete_customer(&mut self.store, id, time, &mut self.events)
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer> {
        self.require_customer(id)
    }

    /// all customers, ordered by name
    pub fn customers(&self) -> Result<Vec<Customer>> {
        let mut rows = self.store.customers()?;
        rows.sort_by_key(|c| c.name.to_lowercase());
        Ok(rows)
    }

    /// substring search over name, phone, address and notes
    pub fn search_customers(&self, term: &str) -> Result<Vec<Customer>> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.customers();
        }

        let mut rows: Vec<Customer> = self
            .store
            .customers()?
            .into_iter()
            .filter(|c| {
                matches_term(&c.name, &term)
                    || c.phone.as_deref().is_some_and(|p| matches_term(p, &term))
                    || c.address.as_deref().is_some_and(|a| matches_term(a, &term))
                    || c.notes.as_deref().is_some_and(|n| matches_term(n, &term))
            })
            .collect();
        rows.sort_by_key(|c| c.name.to_lowercase());
        Ok(rows)
    }

    /// rollup of every record kind the customer owns
    pub fn customer_statistics(
        &self,
        id: CustomerId,
        time: &SafeTimeProvider,
    ) -> Result<CustomerStatistics> {
        self.require_customer(id)?;
        let today = time.now().date_naive();

        let debts = self.store.debts_for_customer(id)?;
        let outstanding_debt = debts
            .iter()
            .filter(|d| !d.is_paid)
            .map(|d| d.amount)
            .sum();
        let settled_debt = debts.iter().filter(|d| d.is_paid).map(|d| d.amount).sum();

        let installments = self.store.installments_for_customer(id)?;
        let mut installment_total = Money::ZERO;
        let mut installment_paid = Money::ZERO;
        for installment in &installments {
            installment_total += installment.total_amount;
            installment_paid += ledger::paid_amount(&self.store, installment.id)?;
        }

        let subscriptions = self.store.subscriptions_for_customer(id)?;
        let active: Vec<_> = subscriptions
            .iter()
            .filter(|s| {
                status::subscription_status(s.start_date, s.end_date, today)
                    == SubscriptionStatus::Active
            })
            .collect();
        let monthly_fees = active.iter().map(|s| s.monthly_fee).sum();

        Ok(CustomerStatistics {
            debts_count: debts.len() as u32,
            outstanding_debt,
            settled_debt,
            installments_count: installments.len() as u32,
            installment_total,
            installment_paid,
            subscriptions_count: subscriptions.len() as u32,
            active_subscriptions_count: active.len() as u32,
            monthly_fees,
        })
    }

    fn phone_in_use(&self, phone: &str, exclude: Option<CustomerId>) -> Result<bool> {
        Ok(self
            .store
            .customers()?
            .iter()
            .any(|c| c.phone.as_deref() == Some(phone) && Some(c.id) != exclude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::models::{DebtDraft, InstallmentDraft, SubscriptionDraft};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn office() -> BackOffice<MemoryStore> {
        BackOffice::new(MemoryStore::new())
    }

    fn draft(name: &str, phone: Option<&str>) -> CustomerDraft {
        CustomerDraft {
            name: name.to_string(),
            phone: phone.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_phone_rejected() {
        let mut office = office();
        let time = test_time();

        office
            .add_customer(draft("Karim", Some("0770 111 2222")), &time)
            .unwrap();
        let err = office
            .add_customer(draft("Samir", Some("0770 111 2222")), &time)
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicatePhone { .. }));

        // different number is fine
        office
            .add_customer(draft("Samir", Some("0770 333 4444")), &time)
            .unwrap();
    }

    #[test]
    fn test_update_keeps_own_phone() {
        let mut office = office();
        let time = test_time();

        let id = office
            .add_customer(draft("Karim", Some("0770 111 2222")), &time)
            .unwrap();
        office
            .add_customer(draft("Samir", Some("0770 333 4444")), &time)
            .unwrap();

        // same customer, same number: allowed
        office
            .update_customer(id, draft("Karim Hasan", Some("0770 111 2222")))
            .unwrap();
        assert_eq!(office.customer(id).unwrap().name, "Karim Hasan");

        // taking the other customer's number: rejected
        let err = office
            .update_customer(id, draft("Karim Hasan", Some("0770 333 4444")))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicatePhone { .. }));
    }

    #[test]
    fn test_customers_sorted_and_searchable() {
        let mut office = office();
        let time = test_time();

        office.add_customer(draft("Zahra", None), &time).unwrap();
        office
            .add_customer(draft("amal", Some("0780 555 0000")), &time)
            .unwrap();
        office.add_customer(draft("Karim", None), &time).unwrap();

        let names: Vec<_> = office
            .customers()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["amal", "Karim", "Zahra"]);

        let hits = office.search_customers("0780").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "amal");

        // blank search lists everyone
        assert_eq!(office.search_customers("  ").unwrap().len(), 3);
    }

    #[test]
    fn test_delete_customer_unreachable_afterwards() {
        let mut office = office();
        let time = test_time();
        let id = office.add_customer(draft("Karim", None), &time).unwrap();

        let installment_id = office
            .add_installment(
                InstallmentDraft {
                    customer_id: id,
                    total_amount: Money::from_major(500),
                    description: "Heater".to_string(),
                    start_date: None,
                },
                &time,
            )
            .unwrap();
        office
            .add_payment(installment_id, Money::from_major(300), None, &time)
            .unwrap();
        office
            .add_payment(installment_id, Money::from_major(200), None, &time)
            .unwrap();
        office
            .add_debt(
                DebtDraft {
                    customer_id: id,
                    amount: Money::from_major(75),
                    description: "Groceries".to_string(),
                    due_date: None,
                },
                &time,
            )
            .unwrap();

        let cascade = office.delete_customer(id, &time).unwrap();
        assert_eq!(cascade.payments_removed, 2);

        assert!(matches!(
            office.customer(id).unwrap_err(),
            CoreError::NotFound { entity: "customer", .. }
        ));
        assert!(matches!(
            office.installment(installment_id).unwrap_err(),
            CoreError::NotFound { entity: "installment", .. }
        ));
        assert!(office.debts_for_customer(id).unwrap().is_empty());
    }

    #[test]
    fn test_customer_statistics_rollup() {
        let mut office = office();
        let time = test_time();
        let id = office.add_customer(draft("Karim", None), &time).unwrap();

        office
            .add_debt(
                DebtDraft {
                    customer_id: id,
                    amount: Money::from_major(80),
                    description: "Groceries".to_string(),
                    due_date: None,
                },
                &time,
            )
            .unwrap();

        let installment_id = office
            .add_installment(
                InstallmentDraft {
                    customer_id: id,
                    total_amount: Money::from_major(1_000),
                    description: "Freezer".to_string(),
                    start_date: None,
                },
                &time,
            )
            .unwrap();
        office
            .add_payment(installment_id, Money::from_major(250), None, &time)
            .unwrap();

        office
            .add_subscription(
                SubscriptionDraft {
                    customer_id: id,
                    plan_name: "Fiber 50".to_string(),
                    monthly_fee: Money::from_major(25),
                    start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                    end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
                },
                &time,
            )
            .unwrap();

        let stats = office.customer_statistics(id, &time).unwrap();
        assert_eq!(stats.debts_count, 1);
        assert_eq!(stats.outstanding_debt, Money::from_major(80));
        assert_eq!(stats.settled_debt, Money::ZERO);
        assert_eq!(stats.installments_count, 1);
        assert_eq!(stats.installment_paid, Money::from_major(250));
        assert_eq!(stats.active_subscriptions_count, 1);
        assert_eq!(stats.monthly_fees, Money::from_major(25));
    }
}
