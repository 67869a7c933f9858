use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, TransactionId, TransactionKind};

/// domain events emitted by loan operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    TransactionRecorded {
        loan_id: LoanId,
        transaction_id: TransactionId,
        kind: TransactionKind,
        amount: Money,
        date: NaiveDate,
    },
    TransactionUpdated {
        loan_id: LoanId,
        transaction_id: TransactionId,
    },
    TransactionDeleted {
        loan_id: LoanId,
        transaction_id: TransactionId,
    },
    SettingsSaved {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    InterestReconciled {
        loan_id: LoanId,
        removed: usize,
        accrued: usize,
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
        Self { events: Vec::new() }
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
