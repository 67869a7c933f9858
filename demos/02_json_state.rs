/// json state - document shapes as they would travel to a real store
use loan_ledger_rs::chrono::{Duration, NaiveDate, TimeZone, Utc};
use loan_ledger_rs::{
    LoanService, MemoryStore, Money, Rate, SafeTimeProvider, SettingsInput, TimeSource,
    TransactionInput, TransactionKind, Uuid,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let service = LoanService::new(MemoryStore::new(), time.clone());
    let loan = Uuid::new_v4();

    service.save_settings(
        loan,
        SettingsInput {
            app_title: "Shared house loan".to_string(),
            initial_loan_amount: Some(Money::from_major(5_000)),
            initial_loan_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            interest_rate: Some(Rate::from_percentage(dec!(12))),
        },
    )?;

    // stage 1: freshly configured, nothing accrued yet
    println!("stage 1: configured, no elapsed months");
    println!("--------------------------------------");
    let ledger = service.get_ledger(loan)?;
    println!("{}\n", serde_json::to_string_pretty(ledger.entries())?);

    // stage 2: two months later, one payment recorded
    controller.advance(Duration::days(62));
    service.add_transaction(
        loan,
        TransactionInput {
            date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            kind: TransactionKind::Payment,
            amount: Money::from_major(1_000),
            description: "First instalment".to_string(),
            author: "bob".to_string(),
        },
    )?;

    println!("stage 2: after two elapsed months and a payment");
    println!("-----------------------------------------------");
    let ledger = service.get_ledger(loan)?;
    println!("{}\n", serde_json::to_string_pretty(ledger.entries())?);

    // the events an application shell would log or forward
    println!("events:");
    for event in service.take_events() {
        println!("{}", serde_json::to_string(&event)?);
    }

    Ok(())
}
