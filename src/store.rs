//! Record store seam.
//!
//! The core only ever talks to storage through [`RecordStore`]; the trait
//! carries exactly the operations the core consumes, nothing dialect-shaped.
//! Reads return `Ok(None)` / mutations return `Ok(false)` for missing rows;
//! `Err(StoreError)` is reserved for the persistence layer itself failing.
//!
//! [`MemoryStore`] is the in-process implementation used by tests and small
//! deployments; a durable backend implements the same trait.

use std::collections::HashMap;

use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::StoreResult;
use crate::models::{Customer, Debt, Installment, Payment, Subscription};
use crate::types::{CustomerId, DebtId, InstallmentId, PaymentId, SubscriptionId};

pub trait RecordStore {
    // customers
    fn insert_customer(&mut self, customer: Customer) -> StoreResult<()>;
    fn customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
    fn customers(&self) -> StoreResult<Vec<Customer>>;
    fn update_customer(&mut self, customer: &Customer) -> StoreResult<bool>;
    fn remove_customer(&mut self, id: CustomerId) -> StoreResult<bool>;

    // debts
    fn insert_debt(&mut self, debt: Debt) -> StoreResult<()>;
    fn debt(&self, id: DebtId) -> StoreResult<Option<Debt>>;
    fn debts(&self) -> StoreResult<Vec<Debt>>;
    fn debts_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Debt>>;
    fn update_debt(&mut self, debt: &Debt) -> StoreResult<bool>;
    fn remove_debt(&mut self, id: DebtId) -> StoreResult<bool>;

    // installments
    fn insert_installment(&mut self, installment: Installment) -> StoreResult<()>;
    fn installment(&self, id: InstallmentId) -> StoreResult<Option<Installment>>;
    fn installments(&self) -> StoreResult<Vec<Installment>>;
    fn installments_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Installment>>;
    fn update_installment(&mut self, installment: &Installment) -> StoreResult<bool>;
    fn remove_installment(&mut self, id: InstallmentId) -> StoreResult<bool>;

    // payments
    fn insert_payment(&mut self, payment: Payment) -> StoreResult<()>;
    fn payment(&self, id: PaymentId) -> StoreResult<Option<Payment>>;
    fn payments_for_installment(&self, installment_id: InstallmentId) -> StoreResult<Vec<Payment>>;
    fn remove_payment(&mut self, id: PaymentId) -> StoreResult<bool>;
    fn remove_payments_for_installment(&mut self, installment_id: InstallmentId)
        -> StoreResult<u32>;
    /// aggregate sum of payment amounts for one installment; zero if none
    fn sum_payments(&self, installment_id: InstallmentId) -> StoreResult<Money>;

    // subscriptions
    fn insert_subscription(&mut self, subscription: Subscription) -> StoreResult<()>;
    fn subscription(&self, id: SubscriptionId) -> StoreResult<Option<Subscription>>;
    fn subscriptions(&self) -> StoreResult<Vec<Subscription>>;
    fn subscriptions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Subscription>>;
    fn update_subscription(&mut self, subscription: &Subscription) -> StoreResult<bool>;
    fn remove_subscription(&mut self, id: SubscriptionId) -> StoreResult<bool>;
}

/// hash-map backed store
///
/// Listing order is unspecified; callers that care sort on their side.
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: HashMap<Uuid, Customer>,
    debts: HashMap<Uuid, Debt>,
    installments: HashMap<Uuid, Installment>,
    payments: HashMap<Uuid, Payment>,
    subscriptions: HashMap<Uuid, Subscription>,
    #[cfg(test)]
    pub(crate) fail_payment_wipe: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert_customer(&mut self, customer: Customer) -> StoreResult<()> {
        self.customers.insert(customer.id, customer);
        Ok(())
    }

    fn customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self.customers.get(&id).cloned())
    }

    fn customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.customers.values().cloned().collect())
    }

    fn update_customer(&mut self, customer: &Customer) -> StoreResult<bool> {
        match self.customers.get_mut(&customer.id) {
            Some(existing) => {
                *existing = customer.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_customer(&mut self, id: CustomerId) -> StoreResult<bool> {
        Ok(self.customers.remove(&id).is_some())
    }

    fn insert_debt(&mut self, debt: Debt) -> StoreResult<()> {
        self.debts.insert(debt.id, debt);
        Ok(())
    }

    fn debt(&self, id: DebtId) -> StoreResult<Option<Debt>> {
        Ok(self.debts.get(&id).cloned())
    }

    fn debts(&self) -> StoreResult<Vec<Debt>> {
        Ok(self.debts.values().cloned().collect())
    }

    fn debts_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<Debt>> {
        Ok(self
            .debts
            .values()
            .filter(|d| d.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn update_debt(&mut self, debt: &Debt) -> StoreResult<bool> {
        match self.debts.get_mut(&debt.id) {
            Some(existing) => {
                *existing = debt.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_debt(&mut self, id: DebtId) -> StoreResult<bool> {
        Ok(self.debts.remove(&id).is_some())
    }

    fn insert_installment(&mut self, installment: Installment) -> StoreResult<()> {
        self.installments.insert(installment.id, installment);
        Ok(())
    }

    fn installment(&self, id: InstallmentId) -> StoreResult<Option<Installment>> {
        Ok(self.installments.get(&id).cloned())
    }

    fn installments(&self) -> StoreResult<Vec<Installment>> {
        Ok(self.installments.values().cloned().collect())
    }

    fn installments_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Installment>> {
        Ok(self
            .installments
            .values()
            .filter(|i| i.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn update_installment(&mut self, installment: &Installment) -> StoreResult<bool> {
        match self.installments.get_mut(&installment.id) {
            Some(existing) => {
                *existing = installment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_installment(&mut self, id: InstallmentId) -> StoreResult<bool> {
        Ok(self.installments.remove(&id).is_some())
    }

    fn insert_payment(&mut self, payment: Payment) -> StoreResult<()> {
        self.payments.insert(payment.id, payment);
        Ok(())
    }

    fn payment(&self, id: PaymentId) -> StoreResult<Option<Payment>> {
        Ok(self.payments.get(&id).cloned())
    }

    fn payments_for_installment(
        &self,
        installment_id: InstallmentId,
    ) -> StoreResult<Vec<Payment>> {
        Ok(self
            .payments
            .values()
            .filter(|p| p.installment_id == installment_id)
            .cloned()
            .collect())
    }

    fn remove_payment(&mut self, id: PaymentId) -> StoreResult<bool> {
        Ok(self.payments.remove(&id).is_some())
    }

    fn remove_payments_for_installment(
        &mut self,
        installment_id: InstallmentId,
    ) -> StoreResult<u32> {
        #[cfg(test)]
        {
            if self.fail_payment_wipe {
                return Err(crate::errors::StoreError::Unavailable {
                    message: "payment table unreachable".to_string(),
                });
            }
        }

        let before = self.payments.len();
        self.payments.retain(|_, p| p.installment_id != installment_id);
        Ok((before - self.payments.len()) as u32)
    }

    fn sum_payments(&self, installment_id: InstallmentId) -> StoreResult<Money> {
        Ok(self
            .payments
            .values()
            .filter(|p| p.installment_id == installment_id)
            .map(|p| p.amount)
            .sum())
    }

    fn insert_subscription(&mut self, subscription: Subscription) -> StoreResult<()> {
        self.subscriptions.insert(subscription.id, subscription);
        Ok(())
    }

    fn subscription(&self, id: SubscriptionId) -> StoreResult<Option<Subscription>> {
        Ok(self.subscriptions.get(&id).cloned())
    }

    fn subscriptions(&self) -> StoreResult<Vec<Subscription>> {
        Ok(self.subscriptions.values().cloned().collect())
    }

    fn subscriptions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .values()
            .filter(|s| s.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn update_subscription(&mut self, subscription: &Subscription) -> StoreResult<bool> {
        match self.subscriptions.get_mut(&subscription.id) {
            Some(existing) => {
                *existing = subscription.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove_subscription(&mut self, id: SubscriptionId) -> StoreResult<bool> {
        Ok(self.subscriptions.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerDraft, InstallmentDraft};
    use chrono::{NaiveDate, Utc};

    fn customer() -> Customer {
        Customer::new(
            CustomerDraft {
                name: "Samir".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_insert_get_remove_roundtrip() {
        let mut store = MemoryStore::new();
        let c = customer();
        let id = c.id;

        store.insert_customer(c).unwrap();
        assert!(store.customer(id).unwrap().is_some());

        assert!(store.remove_customer(id).unwrap());
        assert!(store.customer(id).unwrap().is_none());
        // second remove reports missing
        assert!(!store.remove_customer(id).unwrap());
    }

    #[test]
    fn test_sum_payments_zero_when_none() {
        let store = MemoryStore::new();
        assert_eq!(store.sum_payments(Uuid::new_v4()).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_payments_scoped_to_installment() {
        let mut store = MemoryStore::new();
        let owner = customer();
        let a = Installment::new(
            InstallmentDraft {
                customer_id: owner.id,
                total_amount: Money::from_major(500),
                description: "Heater".to_string(),
                start_date: None,
            },
            Utc::now(),
        );
        let b = Installment::new(
            InstallmentDraft {
                customer_id: owner.id,
                total_amount: Money::from_major(900),
                description: "Television".to_string(),
                start_date: None,
            },
            Utc::now(),
        );
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        store.insert_payment(Payment::new(a.id, Money::from_major(100), day, Utc::now())).unwrap();
        store.insert_payment(Payment::new(a.id, Money::from_major(50), day, Utc::now())).unwrap();
        store.insert_payment(Payment::new(b.id, Money::from_major(70), day, Utc::now())).unwrap();

        assert_eq!(store.sum_payments(a.id).unwrap(), Money::from_major(150));
        assert_eq!(store.sum_payments(b.id).unwrap(), Money::from_major(70));

        assert_eq!(store.remove_payments_for_installment(a.id).unwrap(), 2);
        assert_eq!(store.sum_payments(a.id).unwrap(), Money::ZERO);
        assert_eq!(store.sum_payments(b.id).unwrap(), Money::from_major(70));
    }
}
