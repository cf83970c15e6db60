//! Errors the ledger can return.
//!
//! Validation problems ([`SplitError`], [`ReminderError`], invalid amounts,
//! unknown members) are reported to the caller as-is. Storage failures are
//! logged and hidden behind a generic message.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::reminder::ReminderError;
use crate::schemas::SettlementStatus;
use crate::split::SplitError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Reminder(#[from] ReminderError),
    #[error("amount must be positive, in whole cents and at most 1000000000000, got {0}")]
    InvalidAmount(Decimal),
    #[error("monthly trend covers at most {max} months, got {months}")]
    TrendTooLong { months: u32, max: u32 },
    #[error("a member cannot settle with themselves")]
    SelfSettlement,
    #[error("group `{0}` not found")]
    GroupNotFound(String),
    #[error("group `{0}` already exists")]
    GroupExists(String),
    #[error("member `{0}` not found")]
    MemberNotFound(String),
    #[error("expense `{0}` not found")]
    ExpenseNotFound(String),
    #[error("settlement `{0}` not found")]
    SettlementNotFound(String),
    #[error("settlement `{id}` is {status}, only pending settlements can change")]
    SettlementNotPending { id: String, status: SettlementStatus },
    #[error("member `{0}` has no email address")]
    MissingEmail(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::GroupNotFound(_)
            | LedgerError::MemberNotFound(_)
            | LedgerError::ExpenseNotFound(_)
            | LedgerError::SettlementNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::GroupExists(_) => StatusCode::CONFLICT,
            LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LedgerError::Reminder(ReminderError::Delivery(_)) => StatusCode::BAD_GATEWAY,
            LedgerError::Split(_)
            | LedgerError::Reminder(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::TrendTooLong { .. }
            | LedgerError::SelfSettlement
            | LedgerError::SettlementNotPending { .. }
            | LedgerError::MissingEmail(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            LedgerError::Store(err) => {
                tracing::error!("storage error: {err}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error })
    }
}
