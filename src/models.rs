use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::status;
use crate::types::{
    CustomerId, DebtId, DebtStatus, FeeStatus, InstallmentId, LedgerTotals, PaymentId,
    SubscriptionId, SubscriptionStatus,
};

fn normalize(text: String) -> String {
    text.trim().to_string()
}

fn normalize_opt(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// input for creating or editing a customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl CustomerDraft {
    /// trim text fields, drop empty optionals
    pub fn normalized(self) -> Self {
        Self {
            name: normalize(self.name),
            phone: normalize_opt(self.phone),
            address: normalize_opt(self.address),
            notes: normalize_opt(self.notes),
        }
    }
}

impl Customer {
    pub fn new(draft: CustomerDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            phone: draft.phone,
            address: draft.address,
            notes: draft.notes,
            created_at: now,
        }
    }

    /// overwrite editable fields from a draft
    pub fn apply(&mut self, draft: CustomerDraft) {
        self.name = draft.name;
        self.phone = draft.phone;
        self.address = draft.address;
        self.notes = draft.notes;
    }
}

/// one-off debt owed by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

/// input for creating or editing a debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtDraft {
    pub customer_id: CustomerId,
    pub amount: Money,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

impl DebtDraft {
    pub fn normalized(self) -> Self {
        Self {
            description: normalize(self.description),
            ..self
        }
    }
}

impl Debt {
    pub fn new(draft: DebtDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: draft.customer_id,
            amount: draft.amount,
            description: draft.description,
            due_date: draft.due_date,
            is_paid: false,
            created_at: now,
        }
    }

    pub fn apply(&mut self, draft: DebtDraft) {
        self.amount = draft.amount;
        self.description = draft.description;
        self.due_date = draft.due_date;
    }

    /// derived status for the given day
    pub fn status(&self, today: NaiveDate) -> DebtStatus {
        status::debt_status(self.due_date, self.is_paid, today)
    }
}

/// installment plan with a fixed total, settled through discrete payments
///
/// Paid amount and completion are never stored here; they are derived from
/// the payment log on every read (see the ledger module).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub customer_id: CustomerId,
    pub total_amount: Money,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// input for creating or editing an installment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentDraft {
    pub customer_id: CustomerId,
    pub total_amount: Money,
    pub description: String,
    pub start_date: Option<NaiveDate>,
}

impl InstallmentDraft {
    pub fn normalized(self) -> Self {
        Self {
            description: normalize(self.description),
            ..self
        }
    }
}

impl Installment {
    pub fn new(draft: InstallmentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: draft.customer_id,
            total_amount: draft.total_amount,
            description: draft.description,
            start_date: draft.start_date,
            created_at: now,
        }
    }

    pub fn apply(&mut self, draft: InstallmentDraft) {
        self.total_amount = draft.total_amount;
        self.description = draft.description;
        self.start_date = draft.start_date;
    }
}

/// installment together with its derived amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentSummary {
    pub installment: Installment,
    pub totals: LedgerTotals,
}

/// single amount applied toward an installment's total
///
/// Immutable once created; corrections are made by deleting and re-adding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub installment_id: InstallmentId,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        installment_id: InstallmentId,
        amount: Money,
        paid_on: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            installment_id,
            amount,
            paid_on,
            created_at: now,
        }
    }
}

/// recurring service subscription
///
/// Active/expired is derived from the date window on read; only the fee
/// collection state is stored truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub customer_id: CustomerId,
    pub plan_name: String,
    pub monthly_fee: Money,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub fee_status: FeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// input for creating or editing a subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDraft {
    pub customer_id: CustomerId,
    pub plan_name: String,
    pub monthly_fee: Money,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionDraft {
    pub fn normalized(self) -> Self {
        Self {
            plan_name: normalize(self.plan_name),
            ..self
        }
    }
}

impl Subscription {
    pub fn new(draft: SubscriptionDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: draft.customer_id,
            plan_name: draft.plan_name,
            monthly_fee: draft.monthly_fee,
            start_date: draft.start_date,
            end_date: draft.end_date,
            fee_status: FeeStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, draft: SubscriptionDraft, now: DateTime<Utc>) {
        self.plan_name = draft.plan_name;
        self.monthly_fee = draft.monthly_fee;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.updated_at = now;
    }

    /// derived status for the given day
    pub fn status(&self, today: NaiveDate) -> SubscriptionStatus {
        status::subscription_status(self.start_date, self.end_date, today)
    }
}
