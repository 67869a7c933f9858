pub mod accrual;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod projection;
pub mod service;
pub mod settings;
pub mod store;
pub mod transaction;
pub mod types;

// re-export key types
pub use accrual::{reconcile_interest, AccrualDelta, MATERIALITY_THRESHOLD};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{build_ledger, Ledger, LedgerEntry};
pub use projection::{project_amortization, AmortizationRow, MAX_PROJECTION_MONTHS};
pub use service::LoanService;
pub use settings::{LoanSettings, SettingsInput};
pub use store::{LoanStore, MemoryStore, StoreError, SubscriptionId, WriteOp};
pub use transaction::{Transaction, TransactionInput, TransactionPatch};
pub use types::{
    Author, EntryKind, LoanId, SortDirection, TransactionId, TransactionKind,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
