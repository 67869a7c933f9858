use std::collections::HashSet;
use std::sync::Mutex;

use hourglass_rs::SafeTimeProvider;

use crate::accrual::reconcile_interest;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::{build_ledger, Ledger};
use crate::projection::{project_amortization, AmortizationRow};
use crate::settings::SettingsInput;
use crate::store::{LoanStore, WriteOp};
use crate::transaction::{Transaction, TransactionInput};
use crate::types::{LoanId, TransactionId, TransactionKind};

/// the presentation-facing loan api.
///
/// wraps a document store and a time provider; every mutation validates
/// first, writes through the store, and then runs an interest reconciliation
/// pass. the ledger is recomputed in full from a fresh snapshot on every
/// read, never patched incrementally.
pub struct LoanService<S: LoanStore> {
    store: S,
    time: SafeTimeProvider,
    reconciling: Mutex<HashSet<LoanId>>,
    events: Mutex<EventStore>,
}

impl<S: LoanStore> LoanService<S> {
    pub fn new(store: S, time: SafeTimeProvider) -> Self {
        Self {
            store,
            time,
            reconciling: Mutex::new(HashSet::new()),
            events: Mutex::new(EventStore::new()),
        }
    }

    /// the underlying store, e.g. for change subscriptions
    pub fn store(&self) -> &S {
        &self.store
    }

    /// drain the domain events collected so far
    pub fn take_events(&self) -> Vec<Event> {
        self.events.lock().expect("event lock poisoned").take_events()
    }

    fn emit(&self, event: Event) {
        self.events.lock().expect("event lock poisoned").emit(event);
    }

    /// derived ledger for a loan; an unconfigured loan yields an empty ledger
    pub fn get_ledger(&self, loan_id: LoanId) -> Result<Ledger> {
        let settings = match self.store.read_settings(loan_id)? {
            Some(settings) => settings,
            None => return Ok(Ledger::empty()),
        };
        let transactions = self.store.read_transactions(loan_id)?;
        Ok(build_ledger(&settings, &transactions))
    }

    /// record a new payment or loan increase, then reconcile interest
    pub fn add_transaction(
        &self,
        loan_id: LoanId,
        input: TransactionInput,
    ) -> Result<TransactionId> {
        if input.kind == TransactionKind::Interest {
            return Err(LedgerError::InterestEntryReserved);
        }
        let transaction = input.into_transaction(self.time.now())?;
        let id = transaction.id;
        self.store.write_transaction(loan_id, transaction.clone())?;
        self.emit(Event::TransactionRecorded {
            loan_id,
            transaction_id: id,
            kind: transaction.kind,
            amount: transaction.amount,
            date: transaction.date,
        });
        self.reconcile(loan_id)?;
        Ok(id)
    }

    /// edit a user-authored transaction, then reconcile interest
    pub fn update_transaction(
        &self,
        loan_id: LoanId,
        id: TransactionId,
        input: TransactionInput,
    ) -> Result<()> {
        if input.kind == TransactionKind::Interest {
            return Err(LedgerError::InterestEntryReserved);
        }
        self.guard_user_authored(loan_id, id)?;
        let patch = input.into_patch()?;
        self.store.update_transaction(loan_id, id, patch)?;
        self.emit(Event::TransactionUpdated {
            loan_id,
            transaction_id: id,
        });
        self.reconcile(loan_id)?;
        Ok(())
    }

    /// delete a user-authored transaction, then reconcile interest
    pub fn delete_transaction(&self, loan_id: LoanId, id: TransactionId) -> Result<()> {
        self.guard_user_authored(loan_id, id)?;
        self.store.delete_transaction(loan_id, id)?;
        self.emit(Event::TransactionDeleted {
            loan_id,
            transaction_id: id,
        });
        self.reconcile(loan_id)?;
        Ok(())
    }

    /// validate and save settings, then reconcile interest
    pub fn save_settings(&self, loan_id: LoanId, input: SettingsInput) -> Result<()> {
        let now = self.time.now();
        let existing = self.store.read_settings(loan_id)?;
        let settings = input.into_settings(existing.as_ref(), now)?;
        self.store.write_settings(loan_id, settings)?;
        self.emit(Event::SettingsSaved {
            loan_id,
            timestamp: now,
        });
        self.reconcile(loan_id)?;
        Ok(())
    }

    /// amortization projection from the loan's current balance and rate
    pub fn project_amortization(
        &self,
        loan_id: LoanId,
        monthly_payment: Money,
    ) -> Result<Vec<AmortizationRow>> {
        let rate = self
            .store
            .read_settings(loan_id)?
            .and_then(|s| s.interest_rate)
            .unwrap_or(Rate::ZERO);
        let ledger = self.get_ledger(loan_id)?;
        project_amortization(ledger.current_balance, rate, monthly_payment)
    }

    /// regenerate the interest accrual set and commit the delta atomically.
    ///
    /// a pass that finds another pass in flight for the same loan returns
    /// without doing anything; the in-flight pass (or the next trigger) will
    /// converge on the same canonical set.
    pub fn reconcile(&self, loan_id: LoanId) -> Result<()> {
        let _guard = match ReconcileGuard::acquire(&self.reconciling, loan_id) {
            Some(guard) => guard,
            None => return Ok(()),
        };

        let settings = match self.store.read_settings(loan_id)? {
            Some(settings) => settings,
            None => return Ok(()),
        };
        let transactions = self.store.read_transactions(loan_id)?;
        let now = self.time.now();
        let delta = reconcile_interest(&settings, &transactions, now.date_naive(), now);
        if delta.is_empty() {
            return Ok(());
        }

        let removed = delta.to_delete.len();
        let accrued = delta.to_insert.len();
        let mut ops: Vec<WriteOp> = delta
            .to_delete
            .into_iter()
            .map(|id| WriteOp::DeleteTransaction(loan_id, id))
            .collect();
        ops.extend(
            delta
                .to_insert
                .into_iter()
                .map(|t| WriteOp::PutTransaction(loan_id, t)),
        );
        self.store.atomic_batch(ops)?;

        self.emit(Event::InterestReconciled {
            loan_id,
            removed,
            accrued,
            timestamp: now,
        });
        Ok(())
    }

    fn guard_user_authored(&self, loan_id: LoanId, id: TransactionId) -> Result<Transaction> {
        let transactions = self.store.read_transactions(loan_id)?;
        let transaction = transactions
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(LedgerError::TransactionNotFound { id })?;
        if transaction.author.is_system() {
            return Err(LedgerError::SystemEntryImmutable { id });
        }
        Ok(transaction)
    }
}

/// per-loan in-progress marker; cleared on drop even on the error paths
struct ReconcileGuard<'a> {
    reconciling: &'a Mutex<HashSet<LoanId>>,
    loan_id: LoanId,
}

impl<'a> ReconcileGuard<'a> {
    fn acquire(reconciling: &'a Mutex<HashSet<LoanId>>, loan_id: LoanId) -> Option<Self> {
        let mut in_flight = reconciling.lock().expect("reconcile lock poisoned");
        if !in_flight.insert(loan_id) {
            return None;
        }
        Some(Self {
            reconciling,
            loan_id,
        })
    }
}

impl Drop for ReconcileGuard<'_> {
    fn drop(&mut self) {
        self.reconciling
            .lock()
            .expect("reconcile lock poisoned")
            .remove(&self.loan_id);
    }
}
