use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::settings::LoanSettings;
use crate::transaction::Transaction;
use crate::types::{EntryKind, SortDirection, TransactionId, TransactionKind};

/// one row of the derived ledger; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub kind: EntryKind,
    /// balance after this entry is applied in fold order
    pub running_balance: Money,
    /// backing transaction; none for the synthetic initial entry
    pub source: Option<TransactionId>,
}

impl LedgerEntry {
    /// signed effect on the balance: payments subtract, everything else adds
    fn effect(kind: EntryKind, amount: Money) -> Money {
        match kind {
            EntryKind::Payment => Money::ZERO - amount,
            EntryKind::Initial | EntryKind::LoanIncrease | EntryKind::Interest => amount,
        }
    }
}

/// the derived running-balance view of a loan
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    /// entries in fold order: ascending by date, input order on ties
    entries: Vec<LedgerEntry>,
    pub current_balance: Money,
    /// chronologically latest payment, by fold order
    pub last_payment: Option<LedgerEntry>,
    initial_amount: Money,
    total_principal_paid: Money,
}

impl Ledger {
    /// an empty ledger for a loan that is not yet configured
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            current_balance: Money::ZERO,
            last_payment: None,
            initial_amount: Money::ZERO,
            total_principal_paid: Money::ZERO,
        }
    }

    /// entries in fold order
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// entries in presentation order; fold order is untouched
    pub fn display_entries(&self, direction: SortDirection) -> Vec<&LedgerEntry> {
        match direction {
            SortDirection::Ascending => self.entries.iter().collect(),
            SortDirection::Descending => self.entries.iter().rev().collect(),
        }
    }

    /// share of the initial amount repaid by payments, clamped to 0..=100;
    /// interest and increases are excluded by design
    pub fn percentage_paid_off(&self) -> Decimal {
        if !self.initial_amount.is_positive() {
            return Decimal::ZERO;
        }
        let pct = self.total_principal_paid.as_decimal() / self.initial_amount.as_decimal()
            * Decimal::from(100);
        pct.clamp(Decimal::ZERO, Decimal::from(100)).round_dp(2)
    }

    pub fn is_paid_off(&self) -> bool {
        !self.current_balance.is_positive() && self.initial_amount.is_positive()
    }
}

/// build the running-balance ledger from settings and a transaction snapshot.
///
/// an unconfigured loan yields an empty ledger with balance zero; that is not
/// an error, just a loan nobody has set up yet. pure function of its inputs.
pub fn build_ledger(settings: &LoanSettings, transactions: &[Transaction]) -> Ledger {
    let (initial_amount, initial_date) =
        match (settings.initial_loan_amount, settings.initial_loan_date) {
            (Some(amount), Some(date)) => (amount, date),
            _ => return Ledger::empty(),
        };

    let mut entries = Vec::with_capacity(transactions.len() + 1);
    entries.push(LedgerEntry {
        date: initial_date,
        description: format!("Initial loan - {}", settings.app_title),
        amount: initial_amount,
        kind: EntryKind::Initial,
        running_balance: Money::ZERO,
        source: None,
    });
    for t in transactions {
        entries.push(LedgerEntry {
            date: t.date,
            description: t.description.clone(),
            amount: t.amount,
            kind: t.kind.into(),
            running_balance: Money::ZERO,
            source: Some(t.id),
        });
    }

    // stable sort keeps input order for same-date entries, initial entry first
    entries.sort_by_key(|e| e.date);

    let mut balance = Money::ZERO;
    let mut last_payment = None;
    let mut total_principal_paid = Money::ZERO;
    for entry in &mut entries {
        balance += LedgerEntry::effect(entry.kind, entry.amount);
        entry.running_balance = balance;
        if entry.kind == EntryKind::Payment {
            total_principal_paid += entry.amount;
            last_payment = Some(entry.clone());
        }
    }

    Ledger {
        entries,
        current_balance: balance,
        last_payment,
        initial_amount,
        total_principal_paid,
    }
}

/// balance standing strictly before `cutoff`, folding only the initial entry
/// and the given transactions. the reconciler uses this with interest
/// transactions already filtered out.
pub fn balance_before(
    settings: &LoanSettings,
    transactions: &[Transaction],
    cutoff: NaiveDate,
) -> Money {
    let (initial_amount, initial_date) =
        match (settings.initial_loan_amount, settings.initial_loan_date) {
            (Some(amount), Some(date)) => (amount, date),
            _ => return Money::ZERO,
        };

    let mut balance = Money::ZERO;
    if initial_date < cutoff {
        balance += initial_amount;
    }
    for t in transactions.iter().filter(|t| t.date < cutoff) {
        balance += match t.kind {
            TransactionKind::Payment => Money::ZERO - t.amount,
            TransactionKind::LoanIncrease | TransactionKind::Interest => t.amount,
        };
    }
    balance
}
