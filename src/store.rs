use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::settings::LoanSettings;
use crate::transaction::{Transaction, TransactionPatch};
use crate::types::{LoanId, TransactionId};

/// failures surfaced by the document store; retry policy is the caller's
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("loan not found: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("transaction not found: {id}")]
    TransactionNotFound {
        id: TransactionId,
    },

    #[error("backend failure: {message}")]
    Backend {
        message: String,
    },
}

/// one write in an atomic batch
#[derive(Debug, Clone)]
pub enum WriteOp {
    PutSettings(LoanId, LoanSettings),
    PutTransaction(LoanId, Transaction),
    DeleteTransaction(LoanId, TransactionId),
}

/// change listener invoked after a committed write to a loan
pub type ChangeListener = Arc<dyn Fn(LoanId) + Send + Sync>;

/// handle returned by subscribe; pass back to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// the document store seam.
///
/// the engine only ever sees snapshots through this trait and emits writes
/// back through it; the real storage and sync mechanism lives behind it.
pub trait LoanStore {
    fn read_settings(&self, loan_id: LoanId) -> Result<Option<LoanSettings>, StoreError>;

    /// transactions sorted ascending by date, stable on insertion order
    fn read_transactions(&self, loan_id: LoanId) -> Result<Vec<Transaction>, StoreError>;

    /// merge-style upsert of the settings document
    fn write_settings(&self, loan_id: LoanId, settings: LoanSettings) -> Result<(), StoreError>;

    /// insert or replace a transaction by id
    fn write_transaction(&self, loan_id: LoanId, transaction: Transaction)
        -> Result<(), StoreError>;

    /// patch fields of an existing transaction
    fn update_transaction(
        &self,
        loan_id: LoanId,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<(), StoreError>;

    fn delete_transaction(&self, loan_id: LoanId, id: TransactionId) -> Result<(), StoreError>;

    /// all-or-nothing multi-write; on error nothing is applied
    fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;

    fn subscribe(&self, loan_id: LoanId, listener: ChangeListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

#[derive(Debug, Clone, Default)]
struct LoanRecord {
    settings: Option<LoanSettings>,
    /// insertion order, which doubles as the same-date tie-break
    transactions: Vec<Transaction>,
}

impl LoanRecord {
    fn upsert(&mut self, transaction: Transaction) {
        match self.transactions.iter_mut().find(|t| t.id == transaction.id) {
            Some(slot) => *slot = transaction,
            None => self.transactions.push(transaction),
        }
    }

    fn delete(&mut self, id: TransactionId) -> Result<(), StoreError> {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            return Err(StoreError::TransactionNotFound { id });
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryInner {
    loans: HashMap<LoanId, LoanRecord>,
    listeners: HashMap<u64, (LoanId, ChangeListener)>,
    next_subscription: u64,
}

/// in-memory reference store, used by the tests and demos
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// listeners fire outside the lock so they may call back into the store
    fn notify(&self, loan_ids: &[LoanId]) {
        let interested: Vec<(LoanId, ChangeListener)> = {
            let inner = self.inner.lock().expect("store lock poisoned");
            inner
                .listeners
                .values()
                .filter(|(loan, _)| loan_ids.contains(loan))
                .map(|(loan, listener)| (*loan, Arc::clone(listener)))
                .collect()
        };
        for (loan, listener) in interested {
            listener(loan);
        }
    }
}

impl LoanStore for MemoryStore {
    fn read_settings(&self, loan_id: LoanId) -> Result<Option<LoanSettings>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.loans.get(&loan_id).and_then(|r| r.settings.clone()))
    }

    fn read_transactions(&self, loan_id: LoanId) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut transactions = inner
            .loans
            .get(&loan_id)
            .map(|r| r.transactions.clone())
            .unwrap_or_default();
        transactions.sort_by_key(|t| t.date);
        Ok(transactions)
    }

    fn write_settings(&self, loan_id: LoanId, settings: LoanSettings) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            inner.loans.entry(loan_id).or_default().settings = Some(settings);
        }
        self.notify(&[loan_id]);
        Ok(())
    }

    fn write_transaction(
        &self,
        loan_id: LoanId,
        transaction: Transaction,
    ) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            inner.loans.entry(loan_id).or_default().upsert(transaction);
        }
        self.notify(&[loan_id]);
        Ok(())
    }

    fn update_transaction(
        &self,
        loan_id: LoanId,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            let record = inner
                .loans
                .get_mut(&loan_id)
                .ok_or(StoreError::LoanNotFound { loan_id })?;
            let transaction = record
                .transactions
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(StoreError::TransactionNotFound { id })?;
            patch.apply(transaction);
        }
        self.notify(&[loan_id]);
        Ok(())
    }

    fn delete_transaction(&self, loan_id: LoanId, id: TransactionId) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            let record = inner
                .loans
                .get_mut(&loan_id)
                .ok_or(StoreError::LoanNotFound { loan_id })?;
            record.delete(id)?;
        }
        self.notify(&[loan_id]);
        Ok(())
    }

    fn atomic_batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut touched: Vec<LoanId> = Vec::new();
        {
            let mut inner = self.inner.lock().expect("store lock poisoned");

            // stage every op against working copies; commit only if all apply
            let mut staged: HashMap<LoanId, LoanRecord> = HashMap::new();
            for op in &ops {
                let loan_id = match op {
                    WriteOp::PutSettings(loan, _)
                    | WriteOp::PutTransaction(loan, _)
                    | WriteOp::DeleteTransaction(loan, _) => *loan,
                };
                let record = staged
                    .entry(loan_id)
                    .or_insert_with(|| inner.loans.get(&loan_id).cloned().unwrap_or_default());
                match op {
                    WriteOp::PutSettings(_, settings) => record.settings = Some(settings.clone()),
                    WriteOp::PutTransaction(_, transaction) => record.upsert(transaction.clone()),
                    WriteOp::DeleteTransaction(_, id) => record.delete(*id)?,
                }
            }

            for (loan_id, record) in staged {
                inner.loans.insert(loan_id, record);
                touched.push(loan_id);
            }
        }
        self.notify(&touched);
        Ok(())
    }

    fn subscribe(&self, loan_id: LoanId, listener: ChangeListener) -> SubscriptionId {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let id = inner.next_subscription;
        inner.next_subscription += 1;
        inner.listeners.insert(id, (loan_id, listener));
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.listeners.remove(&id.0);
    }
}
