use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Percentage};

/// unique identifier for a customer
pub type CustomerId = Uuid;
/// unique identifier for a debt
pub type DebtId = Uuid;
/// unique identifier for an installment plan
pub type InstallmentId = Uuid;
/// unique identifier for a payment
pub type PaymentId = Uuid;
/// unique identifier for a subscription
pub type SubscriptionId = Uuid;

/// derived debt status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtStatus {
    /// settled, regardless of dates
    Paid,
    /// open, not yet due (or no due date at all)
    Unpaid,
    /// open and the due date has passed
    Overdue,
}

/// derived subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    /// start date is still ahead
    NotStarted,
    /// today falls inside the start..=end window
    Active,
    /// end date has passed
    Expired,
    /// start or end date missing, no window to evaluate
    Undated,
}

/// collection state of the current period's subscription fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Paid,
    Unpaid,
}

/// derived amounts for one installment, computed from its payment log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total: Money,
    pub paid: Money,
    pub remaining: Money,
    pub completion: Percentage,
    pub completed: bool,
}

/// what a customer cascade delete removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CascadeSummary {
    pub debts_removed: u32,
    pub installments_removed: u32,
    pub payments_removed: u32,
    pub subscriptions_removed: u32,
}

/// aggregate figures over all debts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtStatistics {
    pub total_count: u32,
    pub unpaid_count: u32,
    pub paid_count: u32,
    pub overdue_count: u32,
    pub total_unpaid_amount: Money,
    pub total_paid_amount: Money,
    pub total_overdue_amount: Money,
}

/// aggregate figures over all installment plans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstallmentStatistics {
    pub total_count: u32,
    pub active_count: u32,
    pub completed_count: u32,
    pub total_amount: Money,
    pub total_paid_amount: Money,
    pub total_remaining_amount: Money,
    pub average_completion: Percentage,
}

/// aggregate figures over all subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatistics {
    pub total_count: u32,
    pub active_count: u32,
    pub expired_count: u32,
    pub monthly_revenue: Money,
    pub average_monthly_fee: Money,
}

/// per-customer rollup across every record kind the customer owns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerStatistics {
    pub debts_count: u32,
    pub outstanding_debt: Money,
    pub settled_debt: Money,
    pub installments_count: u32,
    pub installment_total: Money,
    pub installment_paid: Money,
    pub subscriptions_count: u32,
    pub active_subscriptions_count: u32,
    pub monthly_fees: Money,
}
