pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod services;
pub mod status;
pub mod store;
pub mod types;
pub mod validation;

// re-export key types
pub use config::ValidationLimits;
pub use decimal::{Money, Percentage};
pub use errors::{CoreError, ErrorKind, Result, StoreError};
pub use events::{Event, EventStore};
pub use models::{
    Customer, CustomerDraft, Debt, DebtDraft, Installment, InstallmentDraft, InstallmentSummary,
    Payment, Subscription, SubscriptionDraft,
};
pub use services::BackOffice;
pub use status::{debt_status, subscription_status};
pub use store::{MemoryStore, RecordStore};
pub use types::{
    CascadeSummary, CustomerId, CustomerStatistics, DebtId, DebtStatistics, DebtStatus,
    FeeStatus, InstallmentId, InstallmentStatistics, LedgerTotals, PaymentId, SubscriptionId,
    SubscriptionStatistics, SubscriptionStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
