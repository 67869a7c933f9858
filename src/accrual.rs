use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::decimal::Money;
use crate::ledger;
use crate::settings::LoanSettings;
use crate::transaction::Transaction;
use crate::types::TransactionId;

/// accruals with a raw monthly interest below half a cent are skipped,
/// so decimal noise never churns the stored interest set
pub const MATERIALITY_THRESHOLD: Decimal = dec!(0.005);

/// write delta produced by one reconciliation pass; applied atomically
#[derive(Debug, Clone, Default)]
pub struct AccrualDelta {
    pub to_delete: Vec<TransactionId>,
    pub to_insert: Vec<Transaction>,
}

impl AccrualDelta {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_insert.is_empty()
    }
}

/// derive the canonical monthly interest set and diff it against what is
/// stored.
///
/// every fully elapsed calendar month since the initial loan date accrues
/// interest on the month-end balance of the non-interest entries; the current
/// partial month never accrues. when the stored interest set already matches
/// the canonical one the delta is empty, otherwise the full interest history
/// is deleted and regenerated. idempotent and convergent from any starting
/// state.
pub fn reconcile_interest(
    settings: &LoanSettings,
    transactions: &[Transaction],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AccrualDelta {
    let (rate, start) = match (
        settings.interest_rate,
        settings.initial_loan_date,
        settings.initial_loan_amount,
    ) {
        (Some(rate), Some(start), Some(_)) => (rate, start),
        _ => return AccrualDelta::default(),
    };

    let (non_interest, existing): (Vec<&Transaction>, Vec<&Transaction>) =
        transactions.iter().partition(|t| !t.is_interest());
    let non_interest: Vec<Transaction> = non_interest.into_iter().cloned().collect();

    let monthly_rate = rate.monthly().as_decimal();
    let mut canonical: Vec<Transaction> = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    while (year, month) < (today.year(), today.month()) {
        let cutoff = first_of_next_month(year, month);
        let basis = ledger::balance_before(settings, &non_interest, cutoff);
        if basis.is_positive() && monthly_rate > Decimal::ZERO {
            let raw = basis.as_decimal() * monthly_rate;
            if raw >= MATERIALITY_THRESHOLD {
                let accrued_on = cutoff.pred_opt().expect("month end exists");
                // half a cent must round up, not to even, or the amount
                // invariant breaks on the threshold edge
                let amount = Money::from_decimal(
                    raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                );
                canonical.push(Transaction::interest(
                    accrued_on,
                    amount,
                    format!("Interest for {}", accrued_on.format("%B %Y")),
                    now,
                ));
            }
        }
        (year, month) = next_month(year, month);
    }

    if matches_existing(&existing, &canonical) {
        return AccrualDelta::default();
    }

    AccrualDelta {
        to_delete: existing.iter().map(|t| t.id).collect(),
        to_insert: canonical,
    }
}

/// stored interest already canonical when both sets pair up on date and amount
fn matches_existing(existing: &[&Transaction], canonical: &[Transaction]) -> bool {
    if existing.len() != canonical.len() {
        return false;
    }
    let mut stored: Vec<(NaiveDate, Money)> = existing.iter().map(|t| (t.date, t.amount)).collect();
    stored.sort();
    let mut wanted: Vec<(NaiveDate, Money)> = canonical.iter().map(|t| (t.date, t.amount)).collect();
    wanted.sort();
    stored == wanted
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn first_of_next_month(year: i32, month: u32) -> NaiveDate {
    let (y, m) = next_month(year, month);
    NaiveDate::from_ymd_opt(y, m, 1).expect("first of month exists")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::{Author, TransactionKind};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    fn settings(amount: i64, rate_pct: Decimal) -> LoanSettings {
        LoanSettings {
            app_title: "Test loan".to_string(),
            initial_loan_amount: Some(Money::from_major(amount)),
            initial_loan_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            interest_rate: Some(Rate::from_percentage(rate_pct)),
            created_at: now(),
            last_updated: now(),
        }
    }

    fn tx(kind: TransactionKind, amount: Money, date: (i32, u32, u32)) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            kind,
            amount,
            description: kind.label().to_string(),
            author: Author::User("alice".to_string()),
            created_at: now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // scenario: 1000 at 12% with exactly one elapsed month -> one 10.00 accrual
    #[test]
    fn test_one_elapsed_month_accrues_once() {
        let delta = reconcile_interest(&settings(1_000, dec!(12)), &[], day(2024, 2, 15), now());
        assert!(delta.to_delete.is_empty());
        assert_eq!(delta.to_insert.len(), 1);
        let accrual = &delta.to_insert[0];
        assert_eq!(accrual.amount, Money::from_major(10));
        assert_eq!(accrual.date, day(2024, 1, 31));
        assert_eq!(accrual.kind, TransactionKind::Interest);
        assert_eq!(accrual.author, Author::System);
        assert_eq!(accrual.description, "Interest for January 2024");
    }

    #[test]
    fn test_current_partial_month_never_accrues() {
        // loan started this month, nothing has elapsed yet
        let delta = reconcile_interest(&settings(1_000, dec!(12)), &[], day(2024, 1, 31), now());
        assert!(delta.is_empty());
    }

    #[test]
    fn test_unconfigured_or_rateless_loan_is_noop() {
        let mut s = settings(1_000, dec!(12));
        s.interest_rate = None;
        assert!(reconcile_interest(&s, &[], day(2024, 6, 1), now()).is_empty());

        let mut s = settings(1_000, dec!(12));
        s.initial_loan_date = None;
        assert!(reconcile_interest(&s, &[], day(2024, 6, 1), now()).is_empty());
    }

    #[test]
    fn test_mid_month_payment_reduces_that_months_accrual() {
        let txns = vec![tx(
            TransactionKind::Payment,
            Money::from_major(500),
            (2024, 1, 20),
        )];
        let delta = reconcile_interest(&settings(1_000, dec!(12)), &txns, day(2024, 2, 10), now());
        assert_eq!(delta.to_insert.len(), 1);
        assert_eq!(delta.to_insert[0].amount, Money::from_major(5));
    }

    #[test]
    fn test_accruals_do_not_compound_on_prior_interest() {
        // two elapsed months on a flat 1000 balance: both accruals are 10.00
        let delta = reconcile_interest(&settings(1_000, dec!(12)), &[], day(2024, 3, 5), now());
        assert_eq!(delta.to_insert.len(), 2);
        assert_eq!(delta.to_insert[0].amount, Money::from_major(10));
        assert_eq!(delta.to_insert[1].amount, Money::from_major(10));
        assert_eq!(delta.to_insert[1].date, day(2024, 2, 29)); // leap february
    }

    #[test]
    fn test_materiality_threshold_skips_noise() {
        // 0.40 at 12% accrues 0.004 a month, below the half-cent floor
        let s = LoanSettings {
            initial_loan_amount: Some(Money::from_cents(40)),
            ..settings(0, dec!(12))
        };
        let delta = reconcile_interest(&s, &[], day(2024, 2, 15), now());
        assert!(delta.is_empty());

        // 0.50 accrues exactly 0.005, which is material
        let s = LoanSettings {
            initial_loan_amount: Some(Money::from_cents(50)),
            ..settings(0, dec!(12))
        };
        let delta = reconcile_interest(&s, &[], day(2024, 2, 15), now());
        assert_eq!(delta.to_insert.len(), 1);
    }

    #[test]
    fn test_zero_rate_deletes_stale_interest() {
        let stale = Transaction::interest(
            day(2024, 1, 31),
            Money::from_major(10),
            "Interest for January 2024".to_string(),
            now(),
        );
        let delta = reconcile_interest(
            &settings(1_000, dec!(0)),
            &[stale.clone()],
            day(2024, 3, 1),
            now(),
        );
        assert_eq!(delta.to_delete, vec![stale.id]);
        assert!(delta.to_insert.is_empty());
    }

    #[test]
    fn test_negative_balance_does_not_accrue() {
        let txns = vec![tx(
            TransactionKind::Payment,
            Money::from_major(2_000),
            (2024, 1, 5),
        )];
        let delta = reconcile_interest(&settings(1_000, dec!(12)), &txns, day(2024, 3, 1), now());
        assert!(delta.is_empty());
    }

    #[test]
    fn test_idempotent_after_applying_delta() {
        let s = settings(1_000, dec!(12));
        let first = reconcile_interest(&s, &[], day(2024, 3, 5), now());
        assert_eq!(first.to_insert.len(), 2);

        let stored = first.to_insert.clone();
        let second = reconcile_interest(&s, &stored, day(2024, 3, 5), now());
        assert!(second.is_empty());
    }

    #[test]
    fn test_converges_from_arbitrary_stored_state() {
        // wrong amount, wrong date, and a duplicate: one pass rewrites it all
        let stored = vec![
            Transaction::interest(day(2024, 1, 15), Money::from_major(99), "bogus".into(), now()),
            Transaction::interest(day(2024, 1, 31), Money::from_major(10), "dup a".into(), now()),
            Transaction::interest(day(2024, 1, 31), Money::from_major(10), "dup b".into(), now()),
        ];
        let s = settings(1_000, dec!(12));
        let delta = reconcile_interest(&s, &stored, day(2024, 3, 5), now());
        assert_eq!(delta.to_delete.len(), 3);
        assert_eq!(delta.to_insert.len(), 2);

        let converged = delta.to_insert.clone();
        assert!(reconcile_interest(&s, &converged, day(2024, 3, 5), now()).is_empty());
    }

    // scenario: removing a payment changes the accruals that depended on it
    #[test]
    fn test_deleted_payment_changes_dependent_accruals() {
        let s = settings(1_000, dec!(12));
        let payment = tx(TransactionKind::Payment, Money::from_major(500), (2024, 1, 20));
        let today = day(2024, 3, 5);

        let with_payment = reconcile_interest(&s, &[payment.clone()], today, now());
        let amounts: Vec<Money> = with_payment.to_insert.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![Money::from_major(5), Money::from_major(5)]);

        // payment deleted: the stored 5.00 accruals no longer match
        let mut stored = with_payment.to_insert.clone();
        let without = reconcile_interest(&s, &stored, today, now());
        assert_eq!(without.to_delete.len(), 2);
        let amounts: Vec<Money> = without.to_insert.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![Money::from_major(10), Money::from_major(10)]);

        stored = without.to_insert.clone();
        assert!(reconcile_interest(&s, &stored, today, now()).is_empty());
    }

    #[test]
    fn test_year_boundary_walk() {
        let s = LoanSettings {
            initial_loan_date: NaiveDate::from_ymd_opt(2023, 11, 10),
            ..settings(1_200, dec!(10))
        };
        let delta = reconcile_interest(&s, &[], day(2024, 2, 1), now());
        let dates: Vec<NaiveDate> = delta.to_insert.iter().map(|t| t.date).collect();
        assert_eq!(
            dates,
            vec![day(2023, 11, 30), day(2023, 12, 31), day(2024, 1, 31)]
        );
    }
}
