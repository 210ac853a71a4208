//! Per-entity operation sets exposed to the presentation layer.
//!
//! [`BackOffice`] owns the record store, the validation limits and the event
//! store; the entity operations live in one module per entity kind. Every
//! mutation validates its input fully before the store is touched, so a
//! rejected call leaves no partial state, and every failure carries a short
//! message the caller can show as-is.

mod customers;
mod debts;
mod installments;
mod subscriptions;

use crate::config::ValidationLimits;
use crate::errors::{CoreError, Result};
use crate::events::{Event, EventStore};
use crate::models::Customer;
use crate::store::RecordStore;
use crate::types::CustomerId;

/// entry point for the back-office core
pub struct BackOffice<S: RecordStore> {
    store: S,
    limits: ValidationLimits,
    events: EventStore,
}

impl<S: RecordStore> BackOffice<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ValidationLimits::default())
    }

    pub fn with_limits(store: S, limits: ValidationLimits) -> Self {
        Self {
            store,
            limits,
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// events emitted since the last drain
    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// drain accumulated events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn require_customer(&self, id: CustomerId) -> Result<Customer> {
        self.store.customer(id)?.ok_or(CoreError::NotFound {
            entity: "customer",
            id,
        })
    }
}

/// case-insensitive substring match used by the search operations
pub(crate) fn matches_term(text: &str, term_lower: &str) -> bool {
    text.to_lowercase().contains(term_lower)
}
