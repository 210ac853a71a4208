use std::collections::HashMap;

use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{CoreError, Result};
use crate::events::Event;
use crate::models::{Debt, DebtDraft};
use crate::services::{matches_term, BackOffice};
use crate::store::RecordStore;
use crate::types::{CustomerId, DebtId, DebtStatistics, DebtStatus};
use crate::validation;

impl<S: RecordStore> BackOffice<S> {
    /// record a new debt against a customer
    pub fn add_debt(&mut self, draft: DebtDraft, time: &SafeTimeProvider) -> Result<DebtId> {
        let draft = draft.normalized();
        self.require_customer(draft.customer_id)?;
        validation::validate_debt(&draft, &self.limits, time.now().date_naive())?;

        let debt = Debt::new(draft, time.now());
        let debt_id = debt.id;
        let customer_id = debt.customer_id;
        let amount = debt.amount;
        self.store.insert_debt(debt)?;

        self.events.emit(Event::DebtAdded {
            debt_id,
            customer_id,
            amount,
            timestamp: time.now(),
        });

        Ok(debt_id)
    }

    /// edit an open debt's amount, description or due date
    ///
    /// A settled debt can no longer be edited; the owner never changes.
    pub fn update_debt(
        &mut self,
        id: DebtId,
        draft: DebtDraft,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let mut existing = self.require_debt(id)?;
        if existing.is_paid {
            return Err(CoreError::DebtAlreadySettled { id });
        }

        let mut draft = draft.normalized();
        draft.customer_id = existing.customer_id;
        validation::validate_debt(&draft, &self.limits, time.now().date_naive())?;

        existing.apply(draft);
        self.store.update_debt(&existing)?;
        Ok(())
    }

    /// one-way transition to settled
    pub fn mark_debt_paid(&mut self, id: DebtId, time: &SafeTimeProvider) -> Result<()> {
        let mut debt = self.require_debt(id)?;
        if debt.is_paid {
            return Err(CoreError::DebtAlreadySettled { id });
        }

        debt.is_paid = true;
        self.store.update_debt(&debt)?;

        self.events.emit(Event::DebtSettled {
            debt_id: id,
            amount: debt.amount,
            timestamp: time.now(),
        });

        Ok(())
    }

    pub fn delete_debt(&mut self, id: DebtId, time: &SafeTimeProvider) -> Result<()> {
        self.require_debt(id)?;
        self.store.remove_debt(id)?;

        self.events.emit(Event::DebtDeleted {
            debt_id: id,
            timestamp: time.now(),
        });

        Ok(())
    }

    pub fn debt(&self, id: DebtId) -> Result<Debt> {
        self.require_debt(id)
    }

    /// all debts, newest first
    pub fn debts(&self) -> Result<Vec<Debt>> {
        let mut rows = self.store.debts()?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// one customer's debts, newest first
    pub fn debts_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Debt>> {
        let mut rows = self.store.debts_for_customer(customer_id)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn unpaid_debts(&self) -> Result<Vec<Debt>> {
        Ok(self.debts()?.into_iter().filter(|d| !d.is_paid).collect())
    }

    /// open debts whose due date lies strictly before today
    pub fn overdue_debts(&self, time: &SafeTimeProvider) -> Result<Vec<Debt>> {
        let today = time.now().date_naive();
        Ok(self
            .debts()?
            .into_iter()
            .filter(|d| d.status(today) == DebtStatus::Overdue)
            .collect())
    }

    /// derived status of one debt for the injected today
    pub fn debt_status(&self, id: DebtId, time: &SafeTimeProvider) -> Result<DebtStatus> {
        Ok(self.require_debt(id)?.status(time.now().date_naive()))
    }

    /// substring search over description, owner name and amount
    pub fn search_debts(&self, term: &str) -> Result<Vec<Debt>> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.debts();
        }

        let names = self.customer_names()?;
        Ok(self
            .debts()?
            .into_iter()
            .filter(|d| {
                matches_term(&d.description, &term)
                    || d.amount.to_string().contains(&term)
                    || names
                        .get(&d.customer_id)
                        .is_some_and(|n| n.contains(&term))
            })
            .collect())
    }

    pub fn debt_statistics(&self, time: &SafeTimeProvider) -> Result<DebtStatistics> {
        let today = time.now().date_naive();
        let debts = self.store.debts()?;

        let mut stats = DebtStatistics {
            total_count: debts.len() as u32,
            unpaid_count: 0,
            paid_count: 0,
            overdue_count: 0,
            total_unpaid_amount: Money::ZERO,
            total_paid_amount: Money::ZERO,
            total_overdue_amount: Money::ZERO,
        };

        for debt in &debts {
            match debt.status(today) {
                DebtStatus::Paid => {
                    stats.paid_count += 1;
                    stats.total_paid_amount += debt.amount;
                }
                DebtStatus::Unpaid => {
                    stats.unpaid_count += 1;
                    stats.total_unpaid_amount += debt.amount;
                }
                DebtStatus::Overdue => {
                    stats.unpaid_count += 1;
                    stats.overdue_count += 1;
                    stats.total_unpaid_amount += debt.amount;
                    stats.total_overdue_amount += debt.amount;
                }
            }
        }

        Ok(stats)
    }

    fn require_debt(&self, id: DebtId) -> Result<Debt> {
        self.store.debt(id)?.ok_or(CoreError::NotFound {
            entity: "debt",
            id,
        })
    }

    pub(crate) fn customer_names(&self) -> Result<HashMap<CustomerId, String>> {
        Ok(self
            .store
            .customers()?
            .into_iter()
            .map(|c| (c.id, c.name.to_lowercase()))
            .collect())
    }
}
