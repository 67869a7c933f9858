use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// runaway guard: schedules are truncated at 50 years, which is not an error
pub const MAX_PROJECTION_MONTHS: u32 = 600;

/// one projected month of a hypothetical payoff plan; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month index
    pub month: u32,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
}

/// project a month-by-month payoff schedule for a fixed hypothetical payment.
///
/// fails fast when the payment is non-positive or would not even cover one
/// month of interest; otherwise iterates until payoff or the 600-month cap.
/// stateless and side-effect free, safe to call with any candidate payment.
pub fn project_amortization(
    current_balance: Money,
    annual_rate: Rate,
    monthly_payment: Money,
) -> Result<Vec<AmortizationRow>> {
    if !monthly_payment.is_positive() {
        return Err(LedgerError::InvalidPayment {
            amount: monthly_payment,
        });
    }
    if !current_balance.is_positive() {
        return Ok(Vec::new());
    }

    let monthly_rate = annual_rate.monthly().as_decimal();
    let first_interest = (current_balance * monthly_rate).round_dp(2);
    if monthly_payment <= first_interest {
        return Err(LedgerError::PaymentTooSmall {
            payment: monthly_payment,
            monthly_interest: first_interest,
        });
    }

    let mut rows = Vec::new();
    let mut balance = current_balance;
    for month in 1..=MAX_PROJECTION_MONTHS {
        let interest = (balance * monthly_rate).round_dp(2);
        let mut principal = monthly_payment - interest;
        let mut payment = monthly_payment;
        if principal >= balance {
            // final month: pay exactly what remains
            principal = balance;
            payment = interest + principal;
        }
        balance -= principal;

        rows.push(AmortizationRow {
            month,
            payment,
            principal_portion: principal,
            interest_portion: interest,
            ending_balance: balance.max(Money::ZERO),
        });

        if !balance.is_positive() {
            break;
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(pct: i64) -> Rate {
        Rate::from_percentage(pct.into())
    }

    #[test]
    fn test_rejects_non_positive_payment() {
        assert!(matches!(
            project_amortization(Money::from_major(1_000), rate(12), Money::ZERO),
            Err(LedgerError::InvalidPayment { .. })
        ));
        assert!(matches!(
            project_amortization(Money::from_major(1_000), rate(12), Money::from_major(-10)),
            Err(LedgerError::InvalidPayment { .. })
        ));
    }

    // scenario: 1000 at 12% has 10.00 monthly interest; a 10.00 payment stalls
    #[test]
    fn test_payment_equal_to_interest_is_too_small() {
        let err = project_amortization(Money::from_major(1_000), rate(12), Money::from_major(10))
            .unwrap_err();
        match err {
            LedgerError::PaymentTooSmall {
                payment,
                monthly_interest,
            } => {
                assert_eq!(payment, Money::from_major(10));
                assert_eq!(monthly_interest, Money::from_major(10));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_balance_yields_empty_schedule() {
        let rows = project_amortization(Money::ZERO, rate(12), Money::from_major(100)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_zero_rate_divides_evenly() {
        let rows =
            project_amortization(Money::from_major(1_000), Rate::ZERO, Money::from_major(100))
                .unwrap();
        assert_eq!(rows.len(), 10);
        for row in &rows {
            assert_eq!(row.interest_portion, Money::ZERO);
            assert_eq!(row.principal_portion, Money::from_major(100));
        }
        assert_eq!(rows.last().unwrap().ending_balance, Money::ZERO);
    }

    #[test]
    fn test_ending_balance_strictly_decreases_to_zero() {
        let rows =
            project_amortization(Money::from_major(1_000), rate(12), Money::from_major(50))
                .unwrap();
        let mut previous = Money::from_major(1_000);
        for row in &rows {
            assert!(row.ending_balance < previous);
            previous = row.ending_balance;
        }
        assert_eq!(rows.last().unwrap().ending_balance, Money::ZERO);
    }

    #[test]
    fn test_final_month_clamps_payment_to_remainder() {
        let rows =
            project_amortization(Money::from_major(1_000), Rate::ZERO, Money::from_major(300))
                .unwrap();
        assert_eq!(rows.len(), 4);
        let last = rows.last().unwrap();
        assert_eq!(last.payment, Money::from_major(100));
        assert_eq!(last.principal_portion, Money::from_major(100));
        assert_eq!(last.ending_balance, Money::ZERO);
    }

    #[test]
    fn test_interest_plus_principal_equals_payment() {
        let rows =
            project_amortization(Money::from_major(5_000), rate(6), Money::from_major(250))
                .unwrap();
        for row in &rows {
            assert_eq!(row.principal_portion + row.interest_portion, row.payment);
        }
    }

    #[test]
    fn test_runaway_schedule_truncates_at_cap() {
        // 10.01 against 10.00 monthly interest pays off a cent a month at best
        let payment = Money::from_str_exact("10.01").unwrap();
        let rows = project_amortization(Money::from_major(1_000), rate(12), payment).unwrap();
        assert_eq!(rows.len() as u32, MAX_PROJECTION_MONTHS);
        assert!(rows.last().unwrap().ending_balance.is_positive());
    }

    #[test]
    fn test_known_first_month_split() {
        let rows =
            project_amortization(Money::from_major(1_000), rate(12), Money::from_major(100))
                .unwrap();
        let first = &rows[0];
        assert_eq!(first.interest_portion, Money::from_major(10));
        assert_eq!(first.principal_portion, Money::from_major(90));
        assert_eq!(first.ending_balance, Money::from_major(910));
        assert_eq!(rows.len(), 11);
        assert_eq!(
            rows[1].interest_portion,
            Money::from_str_exact("9.10").unwrap()
        );
        // cross-check against the classic result: last payment is smaller
        assert!(rows.last().unwrap().payment < Money::from_major(100));
    }

    #[test]
    fn test_repeatable_with_different_payments() {
        let balance = Money::from_major(2_000);
        let a = project_amortization(balance, rate(12), Money::from_major(100)).unwrap();
        let b = project_amortization(balance, rate(12), Money::from_major(200)).unwrap();
        let a2 = project_amortization(balance, rate(12), Money::from_major(100)).unwrap();
        assert_eq!(a, a2);
        assert!(b.len() < a.len());
        assert_eq!(a[0].interest_portion, dec!(20).into());
    }
}
