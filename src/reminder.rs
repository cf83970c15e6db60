//! Payment reminders for debtors.
//!
//! Delivery itself belongs to an external service. This module only builds
//! the message and hands it to a [`Notifier`].
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::round_cents;
use crate::schemas::Currency;

#[derive(Error, Debug, PartialEq)]
pub enum ReminderError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("reminder amount must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error("failed to deliver reminder: {0}")]
    Delivery(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PaymentReminder {
    pub to_email: String,
    pub to_name: String,
    pub from_name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    pub group_name: String,
}

impl PaymentReminder {
    pub fn validate(&self) -> Result<(), ReminderError> {
        let fields = [
            ("to_email", &self.to_email),
            ("to_name", &self.to_name),
            ("from_name", &self.from_name),
            ("group_name", &self.group_name),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ReminderError::MissingField(*name));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ReminderError::InvalidAmount(self.amount));
        }
        Ok(())
    }

    pub fn formatted_amount(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), round_cents(self.amount))
    }

    pub fn subject(&self) -> String {
        format!(
            "{} is waiting for {} ({})",
            self.from_name,
            self.formatted_amount(),
            self.group_name
        )
    }

    pub fn text_body(&self) -> String {
        format!(
            "Hi {},\n\n{} sent you a friendly reminder that you owe {} in \"{}\".\n\n\
             Once you have paid, mark the settlement as completed so the group stays up to date.\n",
            self.to_name,
            self.from_name,
            self.formatted_amount(),
            self.group_name
        )
    }
}

/// Something that can deliver a reminder to its recipient.
pub trait Notifier {
    fn send(&self, reminder: &PaymentReminder) -> Result<(), ReminderError>;
}

/// Writes reminders to the log instead of sending them. Used when no mail
/// provider is configured.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, reminder: &PaymentReminder) -> Result<(), ReminderError> {
        reminder.validate()?;
        tracing::info!(
            to = %reminder.to_email,
            subject = %reminder.subject(),
            "payment reminder sent"
        );
        Ok(())
    }
}
