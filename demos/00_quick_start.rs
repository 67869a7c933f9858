/// quick start - minimal example to get started
use loan_ledger_rs::{
    LoanService, MemoryStore, Money, Rate, SafeTimeProvider, SettingsInput, SortDirection,
    TimeSource, TransactionInput, TransactionKind, Uuid,
};
use loan_ledger_rs::chrono::NaiveDate;
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let service = LoanService::new(MemoryStore::new(), SafeTimeProvider::new(TimeSource::System));
    let loan = Uuid::new_v4();

    // configure a $10,000 loan at 6% that started in january
    service.save_settings(
        loan,
        SettingsInput {
            app_title: "Car loan".to_string(),
            initial_loan_amount: Some(Money::from_major(10_000)),
            initial_loan_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            interest_rate: Some(Rate::from_percentage(dec!(6))),
        },
    )?;

    // record a payment
    service.add_transaction(
        loan,
        TransactionInput {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            kind: TransactionKind::Payment,
            amount: Money::from_major(500),
            description: String::new(),
            author: "alice".to_string(),
        },
    )?;

    // print the ledger, newest entries first
    let ledger = service.get_ledger(loan)?;
    for entry in ledger.display_entries(SortDirection::Descending) {
        println!(
            "{}  {:<28} {:>10}  balance {:>10}",
            entry.date, entry.description, entry.amount, entry.running_balance
        );
    }
    println!("paid off: {}%", ledger.percentage_paid_off());

    Ok(())
}
