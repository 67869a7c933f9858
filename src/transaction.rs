use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{Author, TransactionId, TransactionKind};

/// one recorded financial event against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    /// strictly positive; direction is implied by kind
    pub amount: Money,
    pub description: String,
    pub author: Author,
    /// audit only, never used in balance math
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// build a system-authored interest accrual
    pub fn interest(date: NaiveDate, amount: Money, description: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            kind: TransactionKind::Interest,
            amount,
            description,
            author: Author::System,
            created_at: now,
        }
    }

    pub fn is_interest(&self) -> bool {
        self.kind == TransactionKind::Interest
    }
}

/// caller-supplied transaction fields, validated before any write
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Money,
    /// defaulted from kind and date when blank
    pub description: String,
    /// user id of the author
    pub author: String,
}

impl TransactionInput {
    /// validate and build a new transaction
    pub fn into_transaction(self, now: DateTime<Utc>) -> Result<Transaction> {
        let (kind, date, amount) = (self.kind, self.date, self.amount);
        self.check()?;
        Ok(Transaction {
            id: Uuid::new_v4(),
            date,
            kind,
            amount,
            description: self.describe(),
            author: Author::User(self.author),
            created_at: now,
        })
    }

    /// validate and build a field patch for an existing transaction
    pub fn into_patch(self) -> Result<TransactionPatch> {
        self.check()?;
        Ok(TransactionPatch {
            date: Some(self.date),
            kind: Some(self.kind),
            amount: Some(self.amount),
            description: Some(self.describe()),
        })
    }

    fn check(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: self.amount });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        if self.description.trim().is_empty() {
            format!("{} - {}", self.kind.label(), self.date)
        } else {
            self.description.trim().to_string()
        }
    }
}

/// partial update for an existing transaction; unset fields are left alone
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub description: Option<String>,
}

impl TransactionPatch {
    pub fn apply(&self, transaction: &mut Transaction) {
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }
    }
}
