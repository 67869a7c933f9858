/// amortization - compare hypothetical monthly payments
use loan_ledger_rs::{project_amortization, LedgerError, Money, Rate};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== payoff projections for a 12,000 balance at 9% ===\n");

    let balance = Money::from_major(12_000);
    let rate = Rate::from_percentage(dec!(9));

    for candidate in [50, 150, 400, 1_000] {
        let payment = Money::from_major(candidate);
        match project_amortization(balance, rate, payment) {
            Ok(rows) => {
                let last = rows.last().expect("positive balance yields rows");
                let total_interest: Money = rows
                    .iter()
                    .map(|r| r.interest_portion)
                    .fold(Money::ZERO, |acc, x| acc + x);
                println!(
                    "{payment}/month: paid off in {} months, {total_interest} total interest",
                    last.month
                );
            }
            Err(LedgerError::PaymentTooSmall {
                monthly_interest, ..
            }) => {
                println!("{payment}/month: never pays off, monthly interest is {monthly_interest}");
            }
            Err(other) => return Err(other.into()),
        }
    }

    // the first months of the winning plan
    println!("\nfirst three months at 400/month:");
    let rows = project_amortization(balance, rate, Money::from_major(400))?;
    for row in rows.iter().take(3) {
        println!(
            "month {:>2}: payment {} = principal {} + interest {}, balance {}",
            row.month, row.payment, row.principal_portion, row.interest_portion, row.ending_balance
        );
    }

    Ok(())
}
