use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

/// failure of the persistence layer itself, not of the data in it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record store unavailable: {message}")]
    Unavailable {
        message: String,
    },
}

/// broad classification of a failure, for callers that only need the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Overpayment,
    InvalidAmount,
    StoreUnavailable,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{field} is required")]
    MissingField {
        field: &'static str,
    },

    #[error("{field} must be at least {min} characters")]
    FieldTooShort {
        field: &'static str,
        min: usize,
    },

    #[error("{field} is longer than {max} characters")]
    FieldTooLong {
        field: &'static str,
        max: usize,
    },

    #[error("phone number is not valid: {phone}")]
    InvalidPhone {
        phone: String,
    },

    #[error("phone number is already in use: {phone}")]
    DuplicatePhone {
        phone: String,
    },

    #[error("amount must be greater than zero: {amount}")]
    NonPositiveAmount {
        amount: Money,
    },

    #[error("amount is larger than the allowed maximum {max}: {amount}")]
    AmountTooLarge {
        amount: Money,
        max: Money,
    },

    #[error("monthly fee cannot be negative: {fee}")]
    NegativeFee {
        fee: Money,
    },

    #[error("due date cannot be in the past: {due}")]
    DueDateInPast {
        due: NaiveDate,
    },

    #[error("start date {start} must be before end date {end}")]
    InvertedDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("debt is already settled")]
    DebtAlreadySettled {
        id: Uuid,
    },

    #[error("{entity} not found")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },

    #[error("payment amount must be greater than zero: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("payment of {attempted} exceeds the remaining amount: {paid} of {total} already paid")]
    Overpayment {
        attempted: Money,
        paid: Money,
        total: Money,
    },

    #[error("total cannot be lowered below the {collected} already collected: {requested}")]
    TotalBelowCollected {
        requested: Money,
        collected: Money,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// classify the error into one of the five failure kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::MissingField { .. }
            | CoreError::FieldTooShort { .. }
            | CoreError::FieldTooLong { .. }
            | CoreError::InvalidPhone { .. }
            | CoreError::DuplicatePhone { .. }
            | CoreError::NonPositiveAmount { .. }
            | CoreError::AmountTooLarge { .. }
            | CoreError::NegativeFee { .. }
            | CoreError::DueDateInPast { .. }
            | CoreError::InvertedDateRange { .. }
            | CoreError::DebtAlreadySettled { .. }
            | CoreError::InvalidPaymentAmount { .. } => ErrorKind::Validation,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Overpayment { .. } => ErrorKind::Overpayment,
            CoreError::TotalBelowCollected { .. } => ErrorKind::InvalidAmount,
            CoreError::Store(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// whether the caller can fix the input and retry
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::StoreUnavailable
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
