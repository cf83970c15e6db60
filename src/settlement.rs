use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::schemas::{PaymentMethod, Settlement, SettlementStatus, SuggestedSettlement};

impl Settlement {
    /// Records a suggested payment so it can be tracked. New settlements are
    /// always pending.
    pub fn from_suggestion(
        suggestion: SuggestedSettlement,
        method: Option<PaymentMethod>,
        now: DateTime<Utc>,
    ) -> Self {
        Settlement {
            id: Uuid::new_v4().to_string(),
            group_id: suggestion.group_id,
            from: suggestion.from,
            to: suggestion.to,
            amount: suggestion.amount,
            status: SettlementStatus::Pending,
            created_at: now,
            completed_at: None,
            method,
            reminder_sent: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SettlementStatus::Pending
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), LedgerError> {
        self.ensure_pending()?;
        self.status = SettlementStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), LedgerError> {
        self.ensure_pending()?;
        self.status = SettlementStatus::Cancelled;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), LedgerError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(LedgerError::SettlementNotPending {
                id: self.id.clone(),
                status: self.status,
            })
        }
    }
}
