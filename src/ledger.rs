//! Operations on a single group's book.
//!
//! A [`GroupBook`] is owned by the caller and passed around explicitly. Every
//! method here is synchronous and only touches the book it is called on;
//! loading and saving books is the job of [`crate::store`].
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{summarize, Analytics, MAX_TREND_MONTHS};
use crate::balance::compute_balances;
use crate::error::LedgerError;
use crate::exchange::suggest_settlements;
use crate::money::is_valid_amount;
use crate::reminder::PaymentReminder;
use crate::schemas::{
    Balance, Currency, Expense, ExpenseCategory, Group, GroupBook, GroupCategory, Member,
    MemberId, PaymentMethod, Settlement, SuggestedSettlement,
};
use crate::split::SplitPolicy;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewMember {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: GroupCategory,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub members: Vec<NewMember>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<GroupCategory>,
    pub currency: Option<Currency>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub paid_by: MemberId,
    pub split: SplitPolicy,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewSettlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

fn new_member(new: NewMember) -> Member {
    Member {
        id: Uuid::new_v4().to_string(),
        name: new.name,
        email: new.email,
    }
}

impl GroupBook {
    pub fn create(id: impl Into<String>, new: NewGroup, now: DateTime<Utc>) -> Self {
        GroupBook {
            group: Group {
                id: id.into(),
                name: new.name,
                description: new.description,
                category: new.category,
                currency: new.currency,
                members: new.members.into_iter().map(new_member).collect(),
                created_at: now,
                updated_at: now,
            },
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.group.id
    }

    pub fn update_details(&mut self, update: GroupUpdate, now: DateTime<Utc>) {
        let group = &mut self.group;
        if let Some(name) = update.name {
            group.name = name;
        }
        if let Some(description) = update.description {
            group.description = Some(description);
        }
        if let Some(category) = update.category {
            group.category = category;
        }
        if let Some(currency) = update.currency {
            group.currency = currency;
        }
        group.updated_at = now;
    }

    pub fn add_member(&mut self, new: NewMember, now: DateTime<Utc>) -> Member {
        let member = new_member(new);
        self.group.members.push(member.clone());
        self.group.updated_at = now;
        member
    }

    /// Removes a member from the roster. Their expenses and splits are kept.
    pub fn remove_member(&mut self, member_id: &str, now: DateTime<Utc>) -> Result<Member, LedgerError> {
        let index = self
            .group
            .members
            .iter()
            .position(|member| member.id == member_id)
            .ok_or_else(|| LedgerError::MemberNotFound(member_id.to_string()))?;
        self.group.updated_at = now;
        Ok(self.group.members.remove(index))
    }

    fn ensure_member(&self, member_id: &str) -> Result<(), LedgerError> {
        if self.group.has_member(member_id) {
            Ok(())
        } else {
            Err(LedgerError::MemberNotFound(member_id.to_string()))
        }
    }

    /// Validates `new` and builds the expense body, splits included.
    fn build_expense(&self, id: String, new: NewExpense, created_at: DateTime<Utc>) -> Result<Expense, LedgerError> {
        if !is_valid_amount(new.amount) {
            return Err(LedgerError::InvalidAmount(new.amount));
        }
        self.ensure_member(&new.paid_by)?;
        for participant in new.split.participants() {
            self.ensure_member(participant)?;
        }
        let split_between = new.split.apply(new.amount)?;

        Ok(Expense {
            id,
            group_id: self.group.id.clone(),
            description: new.description,
            amount: new.amount,
            currency: new.currency.unwrap_or(self.group.currency),
            paid_by: new.paid_by,
            split_between,
            category: new.category,
            date: new.date,
            created_at,
            notes: new.notes,
        })
    }

    pub fn add_expense(&mut self, new: NewExpense, now: DateTime<Utc>) -> Result<Expense, LedgerError> {
        let expense = self.build_expense(Uuid::new_v4().to_string(), new, now)?;
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    /// Replaces an expense wholesale, including its splits.
    pub fn update_expense(&mut self, expense_id: &str, new: NewExpense) -> Result<Expense, LedgerError> {
        let index = self.expense_index(expense_id)?;
        let created_at = self.expenses[index].created_at;
        let expense = self.build_expense(expense_id.to_string(), new, created_at)?;
        self.expenses[index] = expense.clone();
        Ok(expense)
    }

    pub fn remove_expense(&mut self, expense_id: &str) -> Result<Expense, LedgerError> {
        let index = self.expense_index(expense_id)?;
        Ok(self.expenses.remove(index))
    }

    fn expense_index(&self, expense_id: &str) -> Result<usize, LedgerError> {
        self.expenses
            .iter()
            .position(|expense| expense.id == expense_id)
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.to_string()))
    }

    pub fn balances(&self) -> Vec<Balance> {
        compute_balances(&self.expenses, &self.group.members)
    }

    pub fn suggested_settlements(&self) -> Vec<SuggestedSettlement> {
        suggest_settlements(&self.balances(), &self.group.id)
    }

    pub fn analytics(&self, today: NaiveDate, months: u32, top: usize) -> Result<Analytics, LedgerError> {
        if months > MAX_TREND_MONTHS {
            return Err(LedgerError::TrendTooLong {
                months,
                max: MAX_TREND_MONTHS,
            });
        }
        Ok(summarize(&self.expenses, &self.group.members, today, months, top))
    }

    pub fn record_settlement(&mut self, new: NewSettlement, now: DateTime<Utc>) -> Result<Settlement, LedgerError> {
        if !is_valid_amount(new.amount) {
            return Err(LedgerError::InvalidAmount(new.amount));
        }
        if new.from == new.to {
            return Err(LedgerError::SelfSettlement);
        }
        self.ensure_member(&new.from)?;
        self.ensure_member(&new.to)?;

        let suggestion = SuggestedSettlement {
            group_id: self.group.id.clone(),
            from: new.from,
            to: new.to,
            amount: new.amount,
        };
        let settlement = Settlement::from_suggestion(suggestion, new.method, now);
        self.settlements.push(settlement.clone());
        Ok(settlement)
    }

    fn settlement_mut(&mut self, settlement_id: &str) -> Result<&mut Settlement, LedgerError> {
        self.settlements
            .iter_mut()
            .find(|settlement| settlement.id == settlement_id)
            .ok_or_else(|| LedgerError::SettlementNotFound(settlement_id.to_string()))
    }

    pub fn complete_settlement(&mut self, settlement_id: &str, now: DateTime<Utc>) -> Result<Settlement, LedgerError> {
        let settlement = self.settlement_mut(settlement_id)?;
        settlement.complete(now)?;
        Ok(settlement.clone())
    }

    pub fn cancel_settlement(&mut self, settlement_id: &str) -> Result<Settlement, LedgerError> {
        let settlement = self.settlement_mut(settlement_id)?;
        settlement.cancel()?;
        Ok(settlement.clone())
    }

    /// Builds a reminder for the debtor of a pending settlement and marks the
    /// settlement as reminded.
    pub fn reminder_for(&mut self, settlement_id: &str) -> Result<PaymentReminder, LedgerError> {
        let group = &self.group;
        let settlement = self
            .settlements
            .iter_mut()
            .find(|settlement| settlement.id == settlement_id)
            .ok_or_else(|| LedgerError::SettlementNotFound(settlement_id.to_string()))?;
        if !settlement.is_pending() {
            return Err(LedgerError::SettlementNotPending {
                id: settlement.id.clone(),
                status: settlement.status,
            });
        }

        let debtor = group
            .member(&settlement.from)
            .ok_or_else(|| LedgerError::MemberNotFound(settlement.from.clone()))?;
        let creditor = group
            .member(&settlement.to)
            .ok_or_else(|| LedgerError::MemberNotFound(settlement.to.clone()))?;
        let to_email = debtor
            .email
            .clone()
            .ok_or_else(|| LedgerError::MissingEmail(debtor.id.clone()))?;

        let reminder = PaymentReminder {
            to_email,
            to_name: debtor.name.clone(),
            from_name: creditor.name.clone(),
            amount: settlement.amount,
            currency: group.currency,
            group_name: group.name.clone(),
        };
        reminder.validate()?;
        settlement.reminder_sent = true;
        Ok(reminder)
    }
}
