use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{
    CascadeSummary, CustomerId, DebtId, FeeStatus, InstallmentId, PaymentId, SubscriptionId,
};

/// all events emitted by core operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // customer events
    CustomerAdded {
        customer_id: CustomerId,
        timestamp: DateTime<Utc>,
    },
    CustomerDeleted {
        customer_id: CustomerId,
        cascade: CascadeSummary,
        timestamp: DateTime<Utc>,
    },

    // debt events
    DebtAdded {
        debt_id: DebtId,
        customer_id: CustomerId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    DebtSettled {
        debt_id: DebtId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    DebtDeleted {
        debt_id: DebtId,
        timestamp: DateTime<Utc>,
    },

    // installment events
    InstallmentAdded {
        installment_id: InstallmentId,
        customer_id: CustomerId,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentTotalChanged {
        installment_id: InstallmentId,
        old_total: Money,
        new_total: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentDeleted {
        installment_id: InstallmentId,
        payments_removed: u32,
        timestamp: DateTime<Utc>,
    },
    /// emitted once the payment log covers the full total
    InstallmentSettled {
        installment_id: InstallmentId,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        payment_id: PaymentId,
        installment_id: InstallmentId,
        amount: Money,
        paid_to_date: Money,
        paid_on: NaiveDate,
    },
    PaymentDeleted {
        payment_id: PaymentId,
        installment_id: InstallmentId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // subscription events
    SubscriptionAdded {
        subscription_id: SubscriptionId,
        customer_id: CustomerId,
        monthly_fee: Money,
        timestamp: DateTime<Utc>,
    },
    SubscriptionFeeStatusChanged {
        subscription_id: SubscriptionId,
        fee_status: FeeStatus,
        timestamp: DateTime<Utc>,
    },
    SubscriptionDeleted {
        subscription_id: SubscriptionId,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
