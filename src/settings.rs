use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// per-loan settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSettings {
    /// display name for the loan
    pub app_title: String,
    /// starting amount; absent until the loan is configured
    pub initial_loan_amount: Option<Money>,
    /// starting date; absent until the loan is configured
    pub initial_loan_date: Option<NaiveDate>,
    /// annual interest rate; absent means interest accrual is disabled
    pub interest_rate: Option<Rate>,
    /// audit only, never used in calculations
    pub created_at: DateTime<Utc>,
    /// audit only, never used in calculations
    pub last_updated: DateTime<Utc>,
}

impl LoanSettings {
    /// a loan is configured once both the initial amount and date are known
    pub fn is_configured(&self) -> bool {
        self.initial_loan_amount.is_some() && self.initial_loan_date.is_some()
    }
}

/// caller-supplied settings fields, validated before any write
#[derive(Debug, Clone, Default)]
pub struct SettingsInput {
    pub app_title: String,
    pub initial_loan_amount: Option<Money>,
    pub initial_loan_date: Option<NaiveDate>,
    pub interest_rate: Option<Rate>,
}

impl SettingsInput {
    /// validate and merge over the existing settings, preserving created_at
    pub fn into_settings(
        self,
        existing: Option<&LoanSettings>,
        now: DateTime<Utc>,
    ) -> Result<LoanSettings> {
        if self.app_title.trim().is_empty() {
            return Err(LedgerError::MissingLoanName);
        }
        if let Some(amount) = self.initial_loan_amount {
            if amount.is_negative() {
                return Err(LedgerError::InvalidAmount { amount });
            }
            if self.initial_loan_date.is_none() {
                return Err(LedgerError::InvalidDate {
                    message: "initial loan date is required when an initial amount is set".into(),
                });
            }
        }
        if let Some(rate) = self.interest_rate {
            if rate.is_negative() {
                return Err(LedgerError::InvalidRate { rate });
            }
        }

        Ok(LoanSettings {
            app_title: self.app_title.trim().to_string(),
            initial_loan_amount: self.initial_loan_amount,
            initial_loan_date: self.initial_loan_date,
            interest_rate: self.interest_rate,
            created_at: existing.map(|s| s.created_at).unwrap_or(now),
            last_updated: now,
        })
    }
}
