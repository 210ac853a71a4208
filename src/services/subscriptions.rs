use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{CoreError, Result};
use crate::events::Event;
use crate::models::{Subscription, SubscriptionDraft};
use crate::services::{matches_term, BackOffice};
use crate::store::RecordStore;
use crate::types::{
    CustomerId, FeeStatus, SubscriptionId, SubscriptionStatistics, SubscriptionStatus,
};
use crate::validation;

impl<S: RecordStore> BackOffice<S> {
    /// sign a customer up for a recurring service
    pub fn add_subscription(
        &mut self,
        draft: SubscriptionDraft,
        time: &SafeTimeProvider,
    ) -> Result<SubscriptionId> {
        let draft = draft.normalized();
        self.require_customer(draft.customer_id)?;
        validation::validate_subscription(&draft, &self.limits)?;

        let subscription = Subscription::new(draft, time.now());
        let subscription_id = subscription.id;
        let customer_id = subscription.customer_id;
        let monthly_fee = subscription.monthly_fee;
        self.store.insert_subscription(subscription)?;

        self.events.emit(Event::SubscriptionAdded {
            subscription_id,
            customer_id,
            monthly_fee,
            timestamp: time.now(),
        });

        Ok(subscription_id)
    }

    /// edit a subscription's plan, fee or date window; the owner never changes
    pub fn update_subscription(
        &mut self,
        id: SubscriptionId,
        draft: SubscriptionDraft,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let mut existing = self.require_subscription(id)?;

        let mut draft = draft.normalized();
        draft.customer_id = existing.customer_id;
        validation::validate_subscription(&draft, &self.limits)?;

        existing.apply(draft, time.now());
        self.store.update_subscription(&existing)?;
        Ok(())
    }

    pub fn delete_subscription(
        &mut self,
        id: SubscriptionId,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        self.require_subscription(id)?;
        self.store.remove_subscription(id)?;

        self.events.emit(Event::SubscriptionDeleted {
            subscription_id: id,
            timestamp: time.now(),
        });

        Ok(())
    }

    pub fn subscription(&self, id: SubscriptionId) -> Result<Subscription> {
        self.require_subscription(id)
    }

    /// all subscriptions, newest first
    pub fn subscriptions(&self) -> Result<Vec<Subscription>> {
        let mut rows = self.store.subscriptions()?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// one customer's subscriptions, newest first
    pub fn subscriptions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Subscription>> {
        let mut rows = self.store.subscriptions_for_customer(customer_id)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// subscriptions whose window covers today
    pub fn active_subscriptions(&self, time: &SafeTimeProvider) -> Result<Vec<Subscription>> {
        self.subscriptions_with_status(SubscriptionStatus::Active, time)
    }

    /// subscriptions whose end date has passed
    pub fn expired_subscriptions(&self, time: &SafeTimeProvider) -> Result<Vec<Subscription>> {
        self.subscriptions_with_status(SubscriptionStatus::Expired, time)
    }

    /// derived status of one subscription for the injected today
    ///
    /// Never read from storage: real elapsed time changes it silently.
    pub fn subscription_status(
        &self,
        id: SubscriptionId,
        time: &SafeTimeProvider,
    ) -> Result<SubscriptionStatus> {
        Ok(self.require_subscription(id)?.status(time.now().date_naive()))
    }

    /// flip the collection state of the current period's fee
    pub fn set_fee_status(
        &mut self,
        id: SubscriptionId,
        fee_status: FeeStatus,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let mut subscription = self.require_subscription(id)?;
        subscription.fee_status = fee_status;
        subscription.updated_at = time.now();
        self.store.update_subscription(&subscription)?;

        self.events.emit(Event::SubscriptionFeeStatusChanged {
            subscription_id: id,
            fee_status,
            timestamp: time.now(),
        });

        Ok(())
    }

    /// substring search over plan name, owner name and monthly fee
    pub fn search_subscriptions(&self, term: &str) -> Result<Vec<Subscription>> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.subscriptions();
        }

        let names = self.customer_names()?;
        Ok(self
            .subscriptions()?
            .into_iter()
            .filter(|s| {
                matches_term(&s.plan_name, &term)
                    || s.monthly_fee.to_string().contains(&term)
                    || names
                        .get(&s.customer_id)
                        .is_some_and(|n| n.contains(&term))
            })
            .collect())
    }

    pub fn subscription_statistics(
        &self,
        time: &SafeTimeProvider,
    ) -> Result<SubscriptionStatistics> {
        let today = time.now().date_naive();
        let subscriptions = self.store.subscriptions()?;

        let mut stats = SubscriptionStatistics {
            total_count: subscriptions.len() as u32,
            active_count: 0,
            expired_count: 0,
            monthly_revenue: Money::ZERO,
            average_monthly_fee: Money::ZERO,
        };

        let mut fee_sum = Money::ZERO;
        for subscription in &subscriptions {
            fee_sum += subscription.monthly_fee;
            match subscription.status(today) {
                SubscriptionStatus::Active => {
                    stats.active_count += 1;
                    stats.monthly_revenue += subscription.monthly_fee;
                }
                SubscriptionStatus::Expired => stats.expired_count += 1,
                SubscriptionStatus::NotStarted | SubscriptionStatus::Undated => {}
            }
        }

        if !subscriptions.is_empty() {
            stats.average_monthly_fee =
                fee_sum / rust_decimal::Decimal::from(subscriptions.len() as u64);
        }

        Ok(stats)
    }

    fn subscriptions_with_status(
        &self,
        wanted: SubscriptionStatus,
        time: &SafeTimeProvider,
    ) -> Result<Vec<Subscription>> {
        let today = time.now().date_naive();
        Ok(self
            .subscriptions()?
            .into_iter()
            .filter(|s| s.status(today) == wanted)
            .collect())
    }

    fn require_subscription(&self, id: SubscriptionId) -> Result<Subscription> {
        self.store.subscription(id)?.ok_or(CoreError::NotFound {
            entity: "subscription",
            id,
        })
    }
}
