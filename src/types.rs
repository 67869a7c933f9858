use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a transaction within a loan
pub type TransactionId = Uuid;

/// kind of recorded financial event; direction is implied, amounts are always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    /// reduces the balance
    Payment,
    /// increases the balance
    LoanIncrease,
    /// system-generated monthly accrual, increases the balance
    Interest,
}

impl TransactionKind {
    /// display label used when defaulting descriptions
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Payment => "Payment",
            TransactionKind::LoanIncrease => "Loan increase",
            TransactionKind::Interest => "Interest",
        }
    }
}

/// kind of derived ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    /// synthetic starting entry, not backed by a transaction
    Initial,
    Payment,
    LoanIncrease,
    Interest,
}

impl From<TransactionKind> for EntryKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Payment => EntryKind::Payment,
            TransactionKind::LoanIncrease => EntryKind::LoanIncrease,
            TransactionKind::Interest => EntryKind::Interest,
        }
    }
}

/// who created a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    /// a loan member, identified by their user id
    User(String),
    /// the interest accrual reconciler
    System,
}

impl Author {
    pub fn is_system(&self) -> bool {
        matches!(self, Author::System)
    }
}

/// presentation order for ledger entries; never affects balance computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}
