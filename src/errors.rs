use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::store::StoreError;
use crate::types::TransactionId;

#[derive(Error, Debug)]
pub enum LedgerError {
    // validation failures, rejected before any write
    #[error("invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount {
        amount: Money,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("loan name is required")]
    MissingLoanName,

    #[error("invalid interest rate: {rate}")]
    InvalidRate {
        rate: Rate,
    },

    #[error("transaction not found: {id}")]
    TransactionNotFound {
        id: TransactionId,
    },

    #[error("system-generated entries cannot be modified: {id}")]
    SystemEntryImmutable {
        id: TransactionId,
    },

    #[error("interest entries are generated by reconciliation and cannot be entered directly")]
    InterestEntryReserved,

    // projection failures, pure and always safe to retry
    #[error("invalid monthly payment: {amount}")]
    InvalidPayment {
        amount: Money,
    },

    #[error("payment too small: {payment} does not cover monthly interest of {monthly_interest}")]
    PaymentTooSmall {
        payment: Money,
        monthly_interest: Money,
    },

    // store failures, surfaced to the caller without retry
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
