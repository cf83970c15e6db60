use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type MemberId = String;
pub type GroupId = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCategory {
    Trip,
    Home,
    Couple,
    Event,
    Work,
    #[default]
    Other,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: GroupCategory,
    pub currency: Currency,
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn has_member(&self, id: &str) -> bool {
        self.member(id).is_some()
    }
}

/// ISO-4217 codes the application knows how to handle. Codes are read
/// case-insensitively and always written in upper case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cny,
    Inr,
    Brl,
    Aud,
    Cad,
    Mxn,
    Aed,
    Sar,
}

impl Currency {
    pub const ALL: [Currency; 12] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cny,
        Currency::Inr,
        Currency::Brl,
        Currency::Aud,
        Currency::Cad,
        Currency::Mxn,
        Currency::Aed,
        Currency::Sar,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
            Currency::Inr => "INR",
            Currency::Brl => "BRL",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Mxn => "MXN",
            Currency::Aed => "AED",
            Currency::Sar => "SAR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd | Currency::Mxn => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy | Currency::Cny => "¥",
            Currency::Inr => "₹",
            Currency::Brl => "R$",
            Currency::Aud => "A$",
            Currency::Cad => "C$",
            Currency::Aed => "د.إ",
            Currency::Sar => "﷼",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "British Pound",
            Currency::Jpy => "Japanese Yen",
            Currency::Cny => "Chinese Yuan",
            Currency::Inr => "Indian Rupee",
            Currency::Brl => "Brazilian Real",
            Currency::Aud => "Australian Dollar",
            Currency::Cad => "Canadian Dollar",
            Currency::Mxn => "Mexican Peso",
            Currency::Aed => "UAE Dirham",
            Currency::Sar => "Saudi Riyal",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown currency code `{0}`")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

impl TryFrom<String> for Currency {
    type Error = UnknownCurrency;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Entertainment,
    Shopping,
    Utilities,
    Groceries,
    Health,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food & Dining",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Accommodation => "Accommodation",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Groceries => "Groceries",
            ExpenseCategory::Health => "Health",
            ExpenseCategory::Other => "Other",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "🍔",
            ExpenseCategory::Transport => "🚗",
            ExpenseCategory::Accommodation => "🏨",
            ExpenseCategory::Entertainment => "🎬",
            ExpenseCategory::Shopping => "🛍️",
            ExpenseCategory::Utilities => "💡",
            ExpenseCategory::Groceries => "🛒",
            ExpenseCategory::Health => "💊",
            ExpenseCategory::Other => "📦",
        }
    }
}

/// One member's share of one expense.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Split {
    pub member_id: MemberId,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
    #[serde(default)]
    pub is_paid: bool,
}

impl Split {
    pub fn new(member_id: impl Into<MemberId>, amount: Decimal) -> Self {
        Split {
            member_id: member_id.into(),
            amount,
            percentage: None,
            is_paid: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: String,
    pub group_id: GroupId,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub paid_by: MemberId,
    pub split_between: Vec<Split>,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Net position of a member: positive means the group owes them money.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Balance {
    pub member_id: MemberId,
    pub member_name: String,
    pub amount: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Completed,
    Cancelled,
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Cancelled => "cancelled",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Venmo,
    Paypal,
    Zelle,
    Bank,
    Other,
}

/// A payment that would move `amount` from a debtor to a creditor. Transient
/// until somebody records it as a [`Settlement`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SuggestedSettlement {
    pub group_id: GroupId,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Settlement {
    pub id: String,
    pub group_id: GroupId,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
    pub status: SettlementStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub reminder_sent: bool,
}

/// Everything stored for one group: the group itself plus the expenses and
/// settlements that reference it.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GroupBook {
    #[serde(flatten)]
    pub group: Group,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_parse_case_insensitively() {
        assert_eq!("eur".parse::<Currency>(), Ok(Currency::Eur));
        assert_eq!(" USD ".parse::<Currency>(), Ok(Currency::Usd));
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn currency_codes_are_read_in_any_case_and_written_upper() {
        let err = serde_json::from_str::<Currency>("\"XYZ\"").unwrap_err();
        assert!(err.to_string().contains("unknown currency code `XYZ`"));
        assert_eq!(
            serde_json::from_str::<Currency>("\"brl\"").ok(),
            Some(Currency::Brl)
        );
        assert_eq!(serde_json::to_string(&Currency::Jpy).unwrap(), "\"JPY\"");
    }

    #[test]
    fn unknown_category_is_rejected_on_deserialize() {
        assert!(serde_json::from_str::<ExpenseCategory>("\"pets\"").is_err());
        assert_eq!(
            serde_json::from_str::<ExpenseCategory>("\"groceries\"").ok(),
            Some(ExpenseCategory::Groceries)
        );
    }

    #[test]
    fn category_labels() {
        assert_eq!(ExpenseCategory::Food.label(), "Food & Dining");
        assert_eq!(ExpenseCategory::Other.emoji(), "📦");
    }

    #[test]
    fn split_defaults_to_unpaid() {
        let split: Split = serde_json::from_str(r#"{"member_id": "a", "amount": "10.50"}"#)
            .expect("valid split");
        assert!(!split.is_paid);
        assert_eq!(split.percentage, None);
    }
}
